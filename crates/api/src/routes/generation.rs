//! Route definitions for conversations and streaming generation.
//!
//! ```text
//! POST /conversations             start_conversation
//! POST /conversations/refine      refine
//! POST /generate                  generate (SSE)
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::{conversation, generation};
use crate::state::AppState;

/// Conversation routes, mounted at `/conversations`.
pub fn conversation_router() -> Router<AppState> {
    Router::new()
        .route("/", post(conversation::start_conversation))
        .route("/refine", post(conversation::refine))
}

/// Generation routes, merged at the API root.
pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generation::generate))
}
