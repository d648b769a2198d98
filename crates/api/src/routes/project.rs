//! Route definitions for projects.
//!
//! ```text
//! GET    /                            list_projects
//! POST   /                            create_project
//! POST   /save                        save_new
//! GET    /{id}                        get_project
//! DELETE /{id}                        delete_project
//! POST   /{id}/save                   save_existing
//! POST   /{id}/edit                   edit_project
//! GET    /{id}/versions/{number}      get_version
//! GET    /{id}/preview                preview (?version)
//! GET    /{id}/edits                  list_edits
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Project routes, mounted at `/projects`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(project::list_projects).post(project::create_project),
        )
        // Must come before `/{id}` so "save" is not parsed as an id.
        .route("/save", post(project::save_new))
        .route(
            "/{id}",
            get(project::get_project).delete(project::delete_project),
        )
        .route("/{id}/save", post(project::save_existing))
        .route("/{id}/edit", post(project::edit_project))
        .route("/{id}/versions/{number}", get(project::get_version))
        .route("/{id}/preview", get(project::preview))
        .route("/{id}/edits", get(project::list_edits))
}
