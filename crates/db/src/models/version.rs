//! Version entity model and DTOs.

use forge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::artifact::{Artifact, NewArtifact};

/// A row from the `versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Version {
    pub id: DbId,
    pub project_id: DbId,
    pub number: i32,
    pub summary: String,
    pub created_at: Timestamp,
}

/// Input for writing a version together with its full artifact set.
///
/// The version number is not supplied: it is the project's highest existing
/// number plus one, or 1 for the first version.
#[derive(Debug, Clone)]
pub struct CreateSnapshot {
    pub project_id: DbId,
    pub summary: String,
    pub artifacts: Vec<NewArtifact>,
    /// When set, the project's status is updated in the same write.
    pub mark_ready: bool,
}

/// A version together with every artifact it owns.
#[derive(Debug, Clone, Serialize)]
pub struct VersionSnapshot {
    pub version: Version,
    pub artifacts: Vec<Artifact>,
}
