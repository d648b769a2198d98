//! Streaming full generation.
//!
//! The upstream markdown is relayed as Server-Sent Events while the whole
//! buffer is re-parsed after every chunk:
//!
//! ```text
//! event: chunk   {"text": "..."}                 new markdown since the last chunk
//! event: files   [{"path": "...", "hash": "..."}] complete files, when the list changes
//! event: done    {"artifacts": [...]}             final parse of the full response
//! event: error   {"error": "..."}                 upstream failed mid-stream
//! ```
//!
//! Nothing is persisted here; the client saves the result explicitly.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use forge_core::markdown::ParsedArtifact;
use forge_generation::{ByteStream, StreamingParse};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::ActingUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateBody {
    pub session_id: Option<String>,
}

#[derive(Serialize)]
struct FileEntry<'a> {
    path: &'a str,
    hash: &'a str,
}

/// POST /generate
pub async fn generate(
    State(state): State<AppState>,
    user: ActingUser,
    Json(body): Json<GenerateBody>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let session_id = body
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("session_id is required".into()))?;

    let upstream = state.generation.generate_stream(&session_id).await?;
    tracing::info!(user_id = %user.user_id, session_id = %session_id, "Generation stream opened");

    let events = relay(upstream)
        .flat_map(stream::iter)
        .map(Ok::<_, Infallible>);

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Turn upstream chunks into batches of events. Ends after `done` or `error`.
fn relay(upstream: ByteStream) -> impl Stream<Item = Vec<Event>> {
    stream::unfold(Some((upstream, StreamingParse::new())), |state| async move {
        let Some((mut upstream, mut live)) = state else {
            return None;
        };
        match upstream.next().await {
            Some(Ok(chunk)) => {
                let before = live.buffer().len();
                let changed = live.push(&chunk);

                let mut events = Vec::with_capacity(2);
                let delta = &live.buffer()[before..];
                if !delta.is_empty() {
                    events.push(json_event("chunk", &serde_json::json!({ "text": delta })));
                }
                if changed {
                    events.push(json_event("files", &file_entries(live.artifacts())));
                }
                Some((events, Some((upstream, live))))
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Generation stream failed");
                let event = json_event(
                    "error",
                    &serde_json::json!({ "error": "Generation stream interrupted" }),
                );
                Some((vec![event], None))
            }
            None => {
                let artifacts = live.finish();
                tracing::info!(file_count = artifacts.len(), "Generation stream complete");
                let event = json_event("done", &serde_json::json!({ "artifacts": artifacts }));
                Some((vec![event], None))
            }
        }
    })
}

fn file_entries(artifacts: &[ParsedArtifact]) -> Vec<FileEntry<'_>> {
    artifacts
        .iter()
        .map(|a| FileEntry {
            path: &a.path,
            hash: &a.hash,
        })
        .collect()
}

fn json_event<T: Serialize>(name: &'static str, payload: &T) -> Event {
    Event::default()
        .event(name)
        .json_data(payload)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, event = name, "Failed to encode SSE payload");
            Event::default().event("error").data("encoding failure")
        })
}
