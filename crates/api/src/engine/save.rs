//! Saving generated markdown as a new version.

use forge_core::error::CoreError;
use forge_core::markdown;
use forge_core::project::generated_summary;
use forge_core::types::DbId;
use forge_db::models::artifact::NewArtifact;
use forge_db::models::project::{CreateProject, Project};
use forge_db::models::version::CreateSnapshot;
use forge_db::ProjectStore;
use serde::Serialize;

use crate::engine::access::find_and_authorize;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::ActingUser;
use crate::state::AppState;

/// Result of a save, as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub project_id: DbId,
    pub version: i32,
    pub file_count: usize,
}

/// Pick the project a save lands in.
///
/// An explicit id wins. Without one, a title creates a new project; failing
/// that, the user's last project is reused.
pub async fn resolve_target(
    state: &AppState,
    user: &ActingUser,
    project_id: Option<DbId>,
    title: Option<&str>,
) -> AppResult<Project> {
    let auth = &state.config.auth;
    if let Some(id) = project_id {
        return find_and_authorize(state.store.as_ref(), id, user, auth).await;
    }

    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        let project = state
            .store
            .create_project(&CreateProject {
                owner_id: user.user_id,
                title: title.to_string(),
            })
            .await?;
        tracing::info!(project_id = project.id, user_id = %user.user_id, "Project created for save");
        return Ok(project);
    }

    if let Some(id) = state.last_projects.get(user.user_id).await {
        return find_and_authorize(state.store.as_ref(), id, user, auth).await;
    }

    Err(AppError::Core(CoreError::Validation(
        "title is required to create a new project".into(),
    )))
}

/// Reject a missing or blank `markdown` field before any project is touched.
pub fn require_markdown(markdown: Option<&str>) -> AppResult<&str> {
    markdown.filter(|m| !m.trim().is_empty()).ok_or_else(|| {
        AppError::Core(CoreError::Validation("markdown is required".into()))
    })
}

/// Parse `markdown` and persist every file as the project's next version.
pub async fn save_markdown(
    store: &dyn ProjectStore,
    project: &Project,
    markdown: &str,
) -> AppResult<SaveOutcome> {
    let text = require_markdown(Some(markdown))?;
    let parsed = markdown::parse(text);
    let file_count = parsed.len();

    // The summary names the number this save expects; a concurrent save can
    // take the same number (see VersionRepo::create_snapshot).
    let expected = store
        .latest_version(project.id)
        .await?
        .map_or(1, |v| v.number + 1);

    let snapshot = store
        .create_snapshot(&CreateSnapshot {
            project_id: project.id,
            summary: generated_summary(expected),
            artifacts: parsed.into_iter().map(NewArtifact::from).collect(),
            mark_ready: true,
        })
        .await?;

    tracing::info!(
        project_id = project.id,
        version = snapshot.version.number,
        file_count,
        "Saved generated output"
    );

    Ok(SaveOutcome {
        project_id: project.id,
        version: snapshot.version.number,
        file_count,
    })
}
