//! Project lifecycle status.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle of a project.
///
/// - `Draft` -- created blank, no generated output saved yet.
/// - `Ready` -- at least one version with artifacts exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Ready,
}

impl ProjectStatus {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "ready" => Ok(Self::Ready),
            other => Err(CoreError::Validation(format!(
                "Unknown project status '{other}'"
            ))),
        }
    }
}

/// Default title for projects created without one.
pub const UNTITLED_PROJECT: &str = "Untitled project";

/// Summary stored on a version produced by a full save.
pub fn generated_summary(number: i32) -> String {
    format!("Generated version {number}")
}

/// Maximum number of instruction characters carried into an edit summary.
pub const EDIT_SUMMARY_PROMPT_CHARS: usize = 80;

/// Summary stored on a version produced by an edit.
///
/// Uses the first [`EDIT_SUMMARY_PROMPT_CHARS`] characters of the
/// instructions, or `"Fix error"` when the edit was driven by an error only.
pub fn edit_summary(instructions: Option<&str>) -> String {
    match instructions.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => {
            let head: String = text.chars().take(EDIT_SUMMARY_PROMPT_CHARS).collect();
            format!("Edit: {head}")
        }
        None => "Edit: Fix error".to_string(),
    }
}
