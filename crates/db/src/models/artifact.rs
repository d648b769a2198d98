//! Artifact entity model and DTOs.

use std::collections::BTreeMap;

use forge_core::file::SourceFile;
use forge_core::hashing::sha256_hex;
use forge_core::markdown::ParsedArtifact;
use forge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `artifacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Artifact {
    pub id: DbId,
    pub project_id: DbId,
    pub version_id: DbId,
    pub path: String,
    pub content: String,
    pub content_hash: String,
    pub created_at: Timestamp,
}

impl Artifact {
    pub fn to_source_file(&self) -> SourceFile {
        SourceFile::new(&self.path, &self.content)
    }
}

/// One file of a snapshot about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtifact {
    pub path: String,
    pub content: String,
    pub content_hash: String,
}

impl NewArtifact {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            content_hash: sha256_hex(content.as_bytes()),
            content,
        }
    }

    /// Every entry of a merged snapshot, in path order.
    pub fn from_snapshot(snapshot: &BTreeMap<String, String>) -> Vec<Self> {
        snapshot
            .iter()
            .map(|(path, content)| Self::new(path.as_str(), content.as_str()))
            .collect()
    }
}

impl From<ParsedArtifact> for NewArtifact {
    fn from(parsed: ParsedArtifact) -> Self {
        Self {
            path: parsed.path,
            content: parsed.content,
            content_hash: parsed.hash,
        }
    }
}
