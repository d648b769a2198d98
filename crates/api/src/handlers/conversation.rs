//! Requirements conversation, passed through to the generation service.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use forge_generation::RefineRequest;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::ActingUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RefineBody {
    pub session_id: Option<String>,
    pub message: Option<String>,
    /// Set once the session has produced code; later messages are parsed as
    /// change requests rather than requirements.
    #[serde(default)]
    pub has_generated: bool,
}

/// POST /conversations
pub async fn start_conversation(
    State(state): State<AppState>,
    user: ActingUser,
) -> AppResult<impl IntoResponse> {
    let session = state.generation.start_conversation().await?;
    tracing::info!(user_id = %user.user_id, "Conversation started");
    Ok(Json(DataResponse { data: session }))
}

/// POST /conversations/refine
pub async fn refine(
    State(state): State<AppState>,
    user: ActingUser,
    Json(body): Json<RefineBody>,
) -> AppResult<impl IntoResponse> {
    let (session_id, message) = match (body.session_id, body.message) {
        (Some(s), Some(m)) if !s.trim().is_empty() && !m.trim().is_empty() => (s, m),
        _ => {
            return Err(AppError::BadRequest(
                "session_id and message are required".into(),
            ))
        }
    };

    tracing::debug!(
        user_id = %user.user_id,
        session_id = %session_id,
        has_generated = body.has_generated,
        "Refining conversation"
    );

    let reply = state
        .generation
        .refine(
            &RefineRequest {
                session_id,
                message,
            },
            body.has_generated,
        )
        .await?;

    Ok(Json(DataResponse { data: reply }))
}
