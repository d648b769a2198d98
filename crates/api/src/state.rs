use std::collections::HashMap;
use std::sync::Arc;

use forge_core::types::{DbId, UserId};
use forge_db::ProjectStore;
use forge_generation::GenerationService;
use tokio::sync::RwLock;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Persistence client (Postgres or in-memory).
    pub store: Arc<dyn ProjectStore>,
    /// Client for the external generation service.
    pub generation: Arc<dyn GenerationService>,
    pub config: Arc<ServerConfig>,
    /// Last project each user created, saved to, or edited.
    pub last_projects: Arc<LastProjectCache>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        generation: Arc<dyn GenerationService>,
        config: ServerConfig,
    ) -> Self {
        Self {
            store,
            generation,
            config: Arc::new(config),
            last_projects: Arc::new(LastProjectCache::default()),
        }
    }
}

/// Per-user "last project" pointer.
///
/// A save without a project id or title lands in the user's last project as
/// a new version. Entries are never evicted; a pointer to a deleted project
/// is dropped on delete.
#[derive(Debug, Default)]
pub struct LastProjectCache {
    inner: RwLock<HashMap<UserId, DbId>>,
}

impl LastProjectCache {
    pub async fn get(&self, user_id: UserId) -> Option<DbId> {
        self.inner.read().await.get(&user_id).copied()
    }

    pub async fn set(&self, user_id: UserId, project_id: DbId) {
        self.inner.write().await.insert(user_id, project_id);
    }

    /// Drop every pointer at `project_id`.
    pub async fn forget_project(&self, project_id: DbId) {
        self.inner.write().await.retain(|_, id| *id != project_id);
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn cache_tracks_latest_per_user() {
        let cache = LastProjectCache::default();
        let alice = Uuid::from_u128(1);
        let bob = Uuid::from_u128(2);

        assert_eq!(cache.get(alice).await, None);
        cache.set(alice, 1).await;
        cache.set(alice, 2).await;
        cache.set(bob, 2).await;
        assert_eq!(cache.get(alice).await, Some(2));

        cache.forget_project(2).await;
        assert_eq!(cache.get(alice).await, None);
        assert_eq!(cache.get(bob).await, None);
    }
}
