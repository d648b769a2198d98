//! Handlers for projects, their versions, edits, and previews.
//!
//! Every handler resolves the acting user first. Ownership is checked via
//! [`engine::access`] and only enforced when `REQUIRE_AUTH_PROJECTS` is on.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use forge_core::error::CoreError;
use forge_core::preview::{prepare_sandbox, SynthesizedStub};
use forge_core::project::UNTITLED_PROJECT;
use forge_core::types::DbId;
use forge_db::models::artifact::Artifact;
use forge_db::models::project::{CreateProject, Project};
use forge_db::models::version::Version;

use crate::engine::access::find_and_authorize;
use crate::engine::edit::{self, EditInput};
use crate::engine::save;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::ActingUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum number of projects returned by the list endpoint.
const LIST_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CreateProjectBody {
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveBody {
    pub markdown: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    pub version: Option<i32>,
}

/// A project in the list view. `latest_version` is 0 before the first save.
#[derive(Debug, Serialize)]
pub struct ProjectListItem {
    #[serde(flatten)]
    pub project: Project,
    pub latest_version: i32,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub latest_version: i32,
    pub versions: Vec<Version>,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Serialize)]
pub struct VersionDetail {
    pub version: Version,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub version: i32,
    pub files: BTreeMap<String, String>,
    pub stubs: Vec<SynthesizedStub>,
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// POST /projects
// ---------------------------------------------------------------------------

/// Create an empty project owned by the acting user.
pub async fn create_project(
    State(state): State<AppState>,
    user: ActingUser,
    body: Option<Json<CreateProjectBody>>,
) -> AppResult<impl IntoResponse> {
    let title = body
        .and_then(|Json(b)| b.title)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED_PROJECT.to_string());

    let project = state
        .store
        .create_project(&CreateProject {
            owner_id: user.user_id,
            title,
        })
        .await?;
    state.last_projects.set(user.user_id, project.id).await;

    tracing::info!(project_id = project.id, user_id = %user.user_id, "Project created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

// ---------------------------------------------------------------------------
// GET /projects
// ---------------------------------------------------------------------------

/// The acting user's projects, most recently updated first.
pub async fn list_projects(
    State(state): State<AppState>,
    user: ActingUser,
) -> AppResult<impl IntoResponse> {
    let projects: Vec<ProjectListItem> = state
        .store
        .list_projects(user.user_id, LIST_LIMIT)
        .await?
        .into_iter()
        .map(|s| ProjectListItem {
            project: s.project,
            latest_version: s.latest_version.unwrap_or(0),
        })
        .collect();

    tracing::debug!(count = projects.len(), user_id = %user.user_id, "Listed projects");

    Ok(Json(DataResponse { data: projects }))
}

// ---------------------------------------------------------------------------
// POST /projects/save and POST /projects/{id}/save
// ---------------------------------------------------------------------------

/// Save into a new project (with `title`) or the user's last project.
pub async fn save_new(
    State(state): State<AppState>,
    user: ActingUser,
    Json(body): Json<SaveBody>,
) -> AppResult<impl IntoResponse> {
    save_into(&state, &user, None, body).await
}

/// Save the next version of an existing project.
pub async fn save_existing(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
    Json(body): Json<SaveBody>,
) -> AppResult<impl IntoResponse> {
    save_into(&state, &user, Some(id), body).await
}

async fn save_into(
    state: &AppState,
    user: &ActingUser,
    project_id: Option<DbId>,
    body: SaveBody,
) -> AppResult<Json<DataResponse<save::SaveOutcome>>> {
    let markdown = save::require_markdown(body.markdown.as_deref())?;
    let project = save::resolve_target(state, user, project_id, body.title.as_deref()).await?;
    let outcome = save::save_markdown(state.store.as_ref(), &project, markdown).await?;
    state.last_projects.set(user.user_id, project.id).await;
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}
// ---------------------------------------------------------------------------

/// A project with its version history and the latest version's files.
pub async fn get_project(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.as_ref();
    let project = find_and_authorize(store, id, &user, &state.config.auth).await?;

    let versions = store.list_versions(id).await?;
    let latest = store.latest_version(id).await?;
    let artifacts = match &latest {
        Some(v) => store.list_artifacts(v.id).await?,
        None => Vec::new(),
    };

    Ok(Json(DataResponse {
        data: ProjectDetail {
            project,
            latest_version: latest.map_or(0, |v| v.number),
            versions,
            artifacts,
        },
    }))
}

// ---------------------------------------------------------------------------
// DELETE /projects/{id}
// ---------------------------------------------------------------------------

/// Delete a project and everything under it.
pub async fn delete_project(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_and_authorize(state.store.as_ref(), id, &user, &state.config.auth).await?;

    if !state.store.delete_project(id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }
    state.last_projects.forget_project(id).await;

    tracing::info!(project_id = id, user_id = %user.user_id, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /projects/{id}/edit
// ---------------------------------------------------------------------------

/// Apply instructions or an error report to the latest version.
pub async fn edit_project(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
    Json(input): Json<EditInput>,
) -> AppResult<impl IntoResponse> {
    let project = find_and_authorize(state.store.as_ref(), id, &user, &state.config.auth).await?;

    let outcome = edit::apply_edit(
        state.store.as_ref(),
        state.generation.as_ref(),
        &project,
        &input,
        state.config.relevance_max_files,
    )
    .await?;
    state.last_projects.set(user.user_id, project.id).await;

    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}/versions/{number}
// ---------------------------------------------------------------------------

pub async fn get_version(
    State(state): State<AppState>,
    user: ActingUser,
    Path((id, number)): Path<(DbId, i32)>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.as_ref();
    find_and_authorize(store, id, &user, &state.config.auth).await?;

    let version = store.find_version(id, number).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Version",
            id: i64::from(number),
        })
    })?;
    let artifacts = store.list_artifacts(version.id).await?;

    Ok(Json(DataResponse {
        data: VersionDetail { version, artifacts },
    }))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}/preview
// ---------------------------------------------------------------------------

/// The sandbox file map for a version, with stubs for unresolved imports.
///
/// Defaults to the latest version.
pub async fn preview(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
    Query(params): Query<PreviewParams>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.as_ref();
    find_and_authorize(store, id, &user, &state.config.auth).await?;

    let version = match params.version {
        Some(number) => store.find_version(id, number).await?.ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Version",
                id: i64::from(number),
            })
        })?,
        None => store
            .latest_version(id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Project has no version to preview".into()))?,
    };

    let snapshot: BTreeMap<String, String> = store
        .list_artifacts(version.id)
        .await?
        .into_iter()
        .map(|a| (a.path, a.content))
        .collect();
    let closure = prepare_sandbox(&snapshot);

    if !closure.stubs.is_empty() {
        tracing::debug!(
            project_id = id,
            version = version.number,
            stubs = closure.stubs.len(),
            verified = closure.verified,
            "Synthesized preview stubs"
        );
    }

    Ok(Json(DataResponse {
        data: PreviewResponse {
            version: version.number,
            files: closure.files,
            stubs: closure.stubs,
            verified: closure.verified,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}/edits
// ---------------------------------------------------------------------------

pub async fn list_edits(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(state.store.as_ref(), id, &user, &state.config.auth).await?;
    let edits = state.store.list_edits(id).await?;
    Ok(Json(DataResponse { data: edits }))
}
