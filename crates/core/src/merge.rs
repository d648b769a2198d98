//! Snapshot merging for partial edits.
//!
//! The generation service returns only the files it changed. [`merge`]
//! overlays those onto the latest full snapshot; every untouched file is
//! carried into the next snapshot byte-for-byte. This is a last-writer-wins
//! overlay, not a structural diff.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::file::SourceFile;

/// A full snapshot keyed by canonical path. Ordered so that persisted
/// artifact sets and API responses list files by path.
pub type Snapshot = BTreeMap<String, String>;

/// Build a snapshot from a file list. Later entries overwrite earlier ones.
pub fn snapshot_from<I>(files: I) -> Snapshot
where
    I: IntoIterator<Item = SourceFile>,
{
    files.into_iter().map(|f| (f.path, f.content)).collect()
}

/// Overlay `changed` onto `baseline`, inserting new paths and overwriting
/// existing ones.
pub fn merge(baseline: &Snapshot, changed: &[SourceFile]) -> Snapshot {
    let mut merged = baseline.clone();
    for file in changed {
        merged.insert(file.path.clone(), file.content.clone());
    }
    merged
}

/// What an edit did to the snapshot, for the audit trail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    /// Paths present in the edit response, in response order.
    pub changed: Vec<String>,
    /// Subset of `changed` that did not exist in the baseline.
    pub added: Vec<String>,
    /// Subset of `changed` whose content is byte-identical to the baseline.
    pub unchanged: Vec<String>,
}

impl ChangeSummary {
    /// Comma-separated list of every path the response mentioned.
    pub fn diff_summary(&self) -> String {
        self.changed.join(", ")
    }
}

/// Summarize `changed` relative to `baseline`.
pub fn summarize(baseline: &Snapshot, changed: &[SourceFile]) -> ChangeSummary {
    let mut summary = ChangeSummary::default();
    for file in changed {
        summary.changed.push(file.path.clone());
        match baseline.get(&file.path) {
            None => summary.added.push(file.path.clone()),
            Some(existing) if *existing == file.content => {
                summary.unchanged.push(file.path.clone())
            }
            Some(_) => {}
        }
    }
    summary
}
