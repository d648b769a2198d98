pub mod generation;
pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /projects                                   create, list
/// /projects/save                              save into new or last project
/// /projects/{id}                              detail, delete
/// /projects/{id}/save                         save next version
/// /projects/{id}/edit                         partial edit
/// /projects/{id}/versions/{number}            one version's snapshot
/// /projects/{id}/preview                      sandbox files with stubs (?version)
/// /projects/{id}/edits                        edit audit trail
///
/// /conversations                              start a session
/// /conversations/refine                       refine requirements
/// /generate                                   SSE generation stream
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/conversations", generation::conversation_router())
        .merge(generation::router())
}
