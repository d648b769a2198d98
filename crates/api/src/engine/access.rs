//! Project lookup with ownership checks.

use forge_core::error::CoreError;
use forge_core::types::DbId;
use forge_db::models::project::Project;
use forge_db::ProjectStore;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::ActingUser;

/// Load a project or fail with 404.
pub async fn find_project(store: &dyn ProjectStore, id: DbId) -> AppResult<Project> {
    store
        .find_project(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// Ownership check. A no-op while enforcement is disabled.
pub fn authorize(project: &Project, user: &ActingUser, auth: &AuthConfig) -> AppResult<()> {
    if auth.require_auth_projects && project.owner_id != user.user_id {
        tracing::warn!(
            project_id = project.id,
            user_id = %user.user_id,
            "Rejected access to project owned by another user"
        );
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this project".into(),
        )));
    }
    Ok(())
}

/// Load a project and verify the acting user may touch it.
pub async fn find_and_authorize(
    store: &dyn ProjectStore,
    id: DbId,
    user: &ActingUser,
    auth: &AuthConfig,
) -> AppResult<Project> {
    let project = find_project(store, id).await?;
    authorize(&project, user, auth)?;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;
    use crate::middleware::auth::Identity;

    fn project_owned_by(owner_id: Uuid) -> Project {
        let now = chrono::Utc::now();
        Project {
            id: 1,
            owner_id,
            title: "p".into(),
            status: "draft".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn auth(require_auth_projects: bool) -> AuthConfig {
        AuthConfig {
            jwt: None,
            require_auth_projects,
            dev_fallback_user_id: Uuid::nil(),
        }
    }

    fn acting(user_id: Uuid) -> ActingUser {
        ActingUser {
            user_id,
            identity: Identity::Verified,
        }
    }

    #[test]
    fn owner_mismatch_is_forbidden_only_when_enforced() {
        let project = project_owned_by(Uuid::from_u128(1));
        let stranger = acting(Uuid::from_u128(2));

        assert_matches!(
            authorize(&project, &stranger, &auth(true)),
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
        assert!(authorize(&project, &stranger, &auth(false)).is_ok());
        assert!(authorize(&project, &acting(Uuid::from_u128(1)), &auth(true)).is_ok());
    }
}
