//! The persistence seam used by the API layer.
//!
//! Handlers never see a pool directly: they receive an `Arc<dyn ProjectStore>`
//! in application state. [`PgStore`] is the production implementation;
//! [`MemoryStore`] holds the same data in process and is used when no
//! `DATABASE_URL` is configured and by the HTTP tests.

use async_trait::async_trait;
use chrono::Utc;
use forge_core::project::ProjectStatus;
use forge_core::types::{DbId, UserId};
use tokio::sync::RwLock;

use crate::models::artifact::Artifact;
use crate::models::edit_record::{CreateEditRecord, EditRecord};
use crate::models::project::{CreateProject, Project, ProjectSummary};
use crate::models::version::{CreateSnapshot, Version, VersionSnapshot};
use crate::repositories::{ArtifactRepo, EditRecordRepo, ProjectRepo, VersionRepo};
use crate::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A version must own at least one artifact.
    #[error("Refusing to write version with no artifacts for project {0}")]
    EmptySnapshot(DbId),

    #[error("Project {0} does not exist")]
    MissingProject(DbId),
}

/// Injected persistence client for projects and their version history.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Confirm the backing store is reachable.
    async fn health(&self) -> Result<(), StoreError>;

    async fn create_project(&self, input: &CreateProject) -> Result<Project, StoreError>;

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError>;

    /// An owner's projects, most recently updated first, at most `limit`.
    async fn list_projects(
        &self,
        owner_id: UserId,
        limit: i64,
    ) -> Result<Vec<ProjectSummary>, StoreError>;

    /// Delete a project with all of its artifacts, edit records, and versions.
    async fn delete_project(&self, id: DbId) -> Result<bool, StoreError>;

    /// Atomically write a new version and its full artifact set.
    async fn create_snapshot(&self, input: &CreateSnapshot) -> Result<VersionSnapshot, StoreError>;

    async fn latest_version(&self, project_id: DbId) -> Result<Option<Version>, StoreError>;

    async fn find_version(
        &self,
        project_id: DbId,
        number: i32,
    ) -> Result<Option<Version>, StoreError>;

    /// Versions of a project, highest number first.
    async fn list_versions(&self, project_id: DbId) -> Result<Vec<Version>, StoreError>;

    /// Artifacts of one version, ordered by path.
    async fn list_artifacts(&self, version_id: DbId) -> Result<Vec<Artifact>, StoreError>;

    async fn record_edit(&self, input: &CreateEditRecord) -> Result<EditRecord, StoreError>;

    /// Edit history of a project, newest first.
    async fn list_edits(&self, project_id: DbId) -> Result<Vec<EditRecord>, StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// [`ProjectStore`] backed by the sqlx repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn health(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, StoreError> {
        Ok(ProjectRepo::create(&self.pool, input).await?)
    }

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects(
        &self,
        owner_id: UserId,
        limit: i64,
    ) -> Result<Vec<ProjectSummary>, StoreError> {
        Ok(ProjectRepo::list_by_owner(&self.pool, owner_id, limit).await?)
    }

    async fn delete_project(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(ProjectRepo::delete_cascade(&self.pool, id).await?)
    }

    async fn create_snapshot(&self, input: &CreateSnapshot) -> Result<VersionSnapshot, StoreError> {
        if input.artifacts.is_empty() {
            return Err(StoreError::EmptySnapshot(input.project_id));
        }
        Ok(VersionRepo::create_snapshot(&self.pool, input).await?)
    }

    async fn latest_version(&self, project_id: DbId) -> Result<Option<Version>, StoreError> {
        Ok(VersionRepo::find_latest(&self.pool, project_id).await?)
    }

    async fn find_version(
        &self,
        project_id: DbId,
        number: i32,
    ) -> Result<Option<Version>, StoreError> {
        Ok(VersionRepo::find_by_number(&self.pool, project_id, number).await?)
    }

    async fn list_versions(&self, project_id: DbId) -> Result<Vec<Version>, StoreError> {
        Ok(VersionRepo::list_by_project(&self.pool, project_id).await?)
    }

    async fn list_artifacts(&self, version_id: DbId) -> Result<Vec<Artifact>, StoreError> {
        Ok(ArtifactRepo::list_by_version(&self.pool, version_id).await?)
    }

    async fn record_edit(&self, input: &CreateEditRecord) -> Result<EditRecord, StoreError> {
        Ok(EditRecordRepo::create(&self.pool, input).await?)
    }

    async fn list_edits(&self, project_id: DbId) -> Result<Vec<EditRecord>, StoreError> {
        Ok(EditRecordRepo::list_by_project(&self.pool, project_id).await?)
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryState {
    next_id: DbId,
    projects: Vec<Project>,
    versions: Vec<Version>,
    artifacts: Vec<Artifact>,
    edits: Vec<EditRecord>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn touch_project(&mut self, id: DbId, status: Option<ProjectStatus>) {
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            project.updated_at = Utc::now();
            if let Some(status) = status {
                project.status = status.as_str().to_string();
            }
        }
    }
}

/// [`ProjectStore`] that keeps every row in process memory.
///
/// Each operation holds the lock for its whole duration, so a snapshot write
/// is as atomic here as the transaction in [`PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, StoreError> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let project = Project {
            id: state.allocate_id(),
            owner_id: input.owner_id,
            title: input.title.clone(),
            status: ProjectStatus::Draft.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        state.projects.push(project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        let state = self.state.read().await;
        Ok(state.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(
        &self,
        owner_id: UserId,
        limit: i64,
    ) -> Result<Vec<ProjectSummary>, StoreError> {
        let state = self.state.read().await;
        let mut owned: Vec<&Project> = state
            .projects
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .collect();
        // Newest update first; later inserts win ties so ordering is stable
        // when several writes land within one clock tick.
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(owned
            .into_iter()
            .take(limit)
            .map(|project| ProjectSummary {
                latest_version: state
                    .versions
                    .iter()
                    .filter(|v| v.project_id == project.id)
                    .map(|v| v.number)
                    .max(),
                project: project.clone(),
            })
            .collect())
    }

    async fn delete_project(&self, id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        state.artifacts.retain(|a| a.project_id != id);
        state.edits.retain(|e| e.project_id != id);
        state.versions.retain(|v| v.project_id != id);
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        Ok(state.projects.len() < before)
    }

    async fn create_snapshot(&self, input: &CreateSnapshot) -> Result<VersionSnapshot, StoreError> {
        if input.artifacts.is_empty() {
            return Err(StoreError::EmptySnapshot(input.project_id));
        }

        let mut state = self.state.write().await;
        if !state.projects.iter().any(|p| p.id == input.project_id) {
            return Err(StoreError::MissingProject(input.project_id));
        }

        let number = state
            .versions
            .iter()
            .filter(|v| v.project_id == input.project_id)
            .map(|v| v.number)
            .max()
            .unwrap_or(0)
            + 1;
        let now = Utc::now();
        let version = Version {
            id: state.allocate_id(),
            project_id: input.project_id,
            number,
            summary: input.summary.clone(),
            created_at: now,
        };

        let mut artifacts = Vec::with_capacity(input.artifacts.len());
        for new in &input.artifacts {
            if artifacts.iter().any(|a: &Artifact| a.path == new.path) {
                continue;
            }
            artifacts.push(Artifact {
                id: state.allocate_id(),
                project_id: input.project_id,
                version_id: version.id,
                path: new.path.clone(),
                content: new.content.clone(),
                content_hash: new.content_hash.clone(),
                created_at: now,
            });
        }
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));

        state.versions.push(version.clone());
        state.artifacts.extend(artifacts.iter().cloned());
        let status = input.mark_ready.then_some(ProjectStatus::Ready);
        state.touch_project(input.project_id, status);

        Ok(VersionSnapshot { version, artifacts })
    }

    async fn latest_version(&self, project_id: DbId) -> Result<Option<Version>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .versions
            .iter()
            .filter(|v| v.project_id == project_id)
            .max_by(|a, b| a.number.cmp(&b.number).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn find_version(
        &self,
        project_id: DbId,
        number: i32,
    ) -> Result<Option<Version>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .versions
            .iter()
            .filter(|v| v.project_id == project_id && v.number == number)
            .max_by_key(|v| v.id)
            .cloned())
    }

    async fn list_versions(&self, project_id: DbId) -> Result<Vec<Version>, StoreError> {
        let state = self.state.read().await;
        let mut versions: Vec<Version> = state
            .versions
            .iter()
            .filter(|v| v.project_id == project_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.number.cmp(&a.number).then(b.id.cmp(&a.id)));
        Ok(versions)
    }

    async fn list_artifacts(&self, version_id: DbId) -> Result<Vec<Artifact>, StoreError> {
        let state = self.state.read().await;
        let mut artifacts: Vec<Artifact> = state
            .artifacts
            .iter()
            .filter(|a| a.version_id == version_id)
            .cloned()
            .collect();
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(artifacts)
    }

    async fn record_edit(&self, input: &CreateEditRecord) -> Result<EditRecord, StoreError> {
        let mut state = self.state.write().await;
        let record = EditRecord {
            id: state.allocate_id(),
            project_id: input.project_id,
            version_from: input.version_from,
            version_to: input.version_to,
            prompt: input.prompt.clone(),
            diff_summary: input.diff_summary.clone(),
            created_at: Utc::now(),
        };
        state.edits.push(record.clone());
        Ok(record)
    }

    async fn list_edits(&self, project_id: DbId) -> Result<Vec<EditRecord>, StoreError> {
        let state = self.state.read().await;
        let mut edits: Vec<EditRecord> = state
            .edits
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect();
        edits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(edits)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;
    use crate::models::artifact::NewArtifact;

    fn owner() -> UserId {
        Uuid::from_u128(1)
    }

    async fn project(store: &MemoryStore, owner_id: UserId, title: &str) -> Project {
        store
            .create_project(&CreateProject {
                owner_id,
                title: title.to_string(),
            })
            .await
            .unwrap()
    }

    fn snapshot(project_id: DbId, files: &[(&str, &str)]) -> CreateSnapshot {
        CreateSnapshot {
            project_id,
            summary: "test".to_string(),
            artifacts: files.iter().map(|(p, c)| NewArtifact::new(*p, *c)).collect(),
            mark_ready: true,
        }
    }

    #[tokio::test]
    async fn versions_number_from_one() {
        let store = MemoryStore::new();
        let p = project(&store, owner(), "demo").await;

        for expected in 1..=3 {
            let snap = store
                .create_snapshot(&snapshot(p.id, &[("app/App", "x")]))
                .await
                .unwrap();
            assert_eq!(snap.version.number, expected);
        }

        let latest = store.latest_version(p.id).await.unwrap().unwrap();
        assert_eq!(latest.number, 3);
        let listed: Vec<i32> = store
            .list_versions(p.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.number)
            .collect();
        assert_eq!(listed, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn empty_snapshot_is_rejected_without_a_version() {
        let store = MemoryStore::new();
        let p = project(&store, owner(), "demo").await;

        let result = store.create_snapshot(&snapshot(p.id, &[])).await;

        assert_matches!(result, Err(StoreError::EmptySnapshot(id)) if id == p.id);
        assert!(store.latest_version(p.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn snapshot_marks_ready_and_orders_artifacts() {
        let store = MemoryStore::new();
        let p = project(&store, owner(), "demo").await;
        assert_eq!(p.status(), ProjectStatus::Draft);

        let snap = store
            .create_snapshot(&snapshot(p.id, &[("b.ts", "2"), ("a.ts", "1")]))
            .await
            .unwrap();

        let paths: Vec<_> = snap.artifacts.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["a.ts", "b.ts"]);
        let reloaded = store.find_project(p.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status(), ProjectStatus::Ready);
        assert_eq!(
            store.list_artifacts(snap.version.id).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn list_is_owner_scoped_with_latest_version() {
        let store = MemoryStore::new();
        let mine = project(&store, owner(), "mine").await;
        project(&store, Uuid::from_u128(2), "theirs").await;
        let empty = project(&store, owner(), "empty").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .create_snapshot(&snapshot(mine.id, &[("a", "1")]))
            .await
            .unwrap();
        store
            .create_snapshot(&snapshot(mine.id, &[("a", "2")]))
            .await
            .unwrap();

        let listed = store.list_projects(owner(), 50).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].project.id, mine.id);
        assert_eq!(listed[0].latest_version, Some(2));
        assert_eq!(listed[1].project.id, empty.id);
        assert_eq!(listed[1].latest_version, None);

        assert_eq!(store.list_projects(owner(), 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades() {
        let store = MemoryStore::new();
        let p = project(&store, owner(), "demo").await;
        let snap = store
            .create_snapshot(&snapshot(p.id, &[("a", "1")]))
            .await
            .unwrap();
        store
            .record_edit(&CreateEditRecord {
                project_id: p.id,
                version_from: 1,
                version_to: 2,
                prompt: None,
                diff_summary: "a".to_string(),
            })
            .await
            .unwrap();

        assert!(store.delete_project(p.id).await.unwrap());

        assert!(store.find_project(p.id).await.unwrap().is_none());
        assert!(store.list_versions(p.id).await.unwrap().is_empty());
        assert!(store.list_artifacts(snap.version.id).await.unwrap().is_empty());
        assert!(store.list_edits(p.id).await.unwrap().is_empty());
        assert!(!store.delete_project(p.id).await.unwrap());
    }

    #[tokio::test]
    async fn snapshot_for_unknown_project_fails() {
        let store = MemoryStore::new();
        let result = store.create_snapshot(&snapshot(999, &[("a", "1")])).await;
        assert_matches!(result, Err(StoreError::MissingProject(999)));
    }
}
