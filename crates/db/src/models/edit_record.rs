//! Edit record entity model and DTOs.

use forge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `edit_records` table. Advisory audit data only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EditRecord {
    pub id: DbId,
    pub project_id: DbId,
    pub version_from: i32,
    pub version_to: i32,
    pub prompt: Option<String>,
    /// Comma-separated paths returned by the generation service.
    pub diff_summary: String,
    pub created_at: Timestamp,
}

/// DTO for recording an edit.
#[derive(Debug, Clone)]
pub struct CreateEditRecord {
    pub project_id: DbId,
    pub version_from: i32,
    pub version_to: i32,
    pub prompt: Option<String>,
    pub diff_summary: String,
}
