//! Partial edits: bounded context out, changed files back, merged snapshot in.

use forge_core::error::CoreError;
use forge_core::file::SourceFile;
use forge_core::markdown;
use forge_core::merge;
use forge_core::project::edit_summary;
use forge_core::relevance;
use forge_core::types::DbId;
use forge_db::models::artifact::NewArtifact;
use forge_db::models::edit_record::CreateEditRecord;
use forge_db::models::project::Project;
use forge_db::models::version::CreateSnapshot;
use forge_db::ProjectStore;
use forge_generation::{EditRequest, GenerationService};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// What the user asked for. At least one field must be non-blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditInput {
    pub instructions: Option<String>,
    pub error: Option<String>,
}

impl EditInput {
    fn instructions(&self) -> Option<&str> {
        non_blank(self.instructions.as_deref())
    }

    fn error(&self) -> Option<&str> {
        non_blank(self.error.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Result of an edit, as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct EditOutcome {
    pub project_id: DbId,
    pub version: i32,
    /// Number of files the generation service returned.
    pub changed_count: usize,
    /// Number of files in the new snapshot.
    pub file_count: usize,
    /// The complete new snapshot, ordered by path.
    pub artifacts: Vec<SourceFile>,
}

/// Apply an edit to the latest version of `project`.
///
/// Only relevance-selected files are sent to the generation service, along
/// with the full path index. The returned files are overlaid on the latest
/// snapshot and the result is written as a new version. If the service
/// returns no parseable files nothing is written.
pub async fn apply_edit(
    store: &dyn ProjectStore,
    generation: &dyn GenerationService,
    project: &Project,
    input: &EditInput,
    max_files: usize,
) -> AppResult<EditOutcome> {
    let instructions = input.instructions();
    let error_text = input.error();
    if instructions.is_none() && error_text.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "instructions or error is required".into(),
        )));
    }

    let latest = store.latest_version(project.id).await?.ok_or_else(|| {
        AppError::BadRequest(
            "No versions found. Please save an initial version before editing.".into(),
        )
    })?;

    let current: Vec<SourceFile> = store
        .list_artifacts(latest.id)
        .await?
        .iter()
        .map(|a| a.to_source_file())
        .collect();
    let baseline = merge::snapshot_from(current.iter().cloned());

    let selected = relevance::select(&current, instructions, error_text, max_files);
    tracing::debug!(
        project_id = project.id,
        selected = selected.len(),
        total = current.len(),
        "Selected files for edit"
    );

    let request = EditRequest {
        instructions: instructions.unwrap_or_default().to_string(),
        error: error_text.unwrap_or_default().to_string(),
        files: selected.into_iter().cloned().collect(),
        file_paths: baseline.keys().cloned().collect(),
    };
    let response = generation.edit(&request).await?;

    let changed: Vec<SourceFile> = markdown::parse_blocks(&response)
        .iter()
        .map(|a| a.to_source_file())
        .collect();
    if changed.is_empty() {
        return Err(AppError::Core(CoreError::Upstream(
            "AI did not return any updated files".into(),
        )));
    }

    let merged = merge::merge(&baseline, &changed);
    let changes = merge::summarize(&baseline, &changed);

    let snapshot = store
        .create_snapshot(&CreateSnapshot {
            project_id: project.id,
            summary: edit_summary(instructions),
            artifacts: NewArtifact::from_snapshot(&merged),
            mark_ready: false,
        })
        .await?;
    let version = snapshot.version.number;

    // Audit only; the new version stands even if this fails.
    let record = CreateEditRecord {
        project_id: project.id,
        version_from: latest.number,
        version_to: version,
        prompt: Some(
            instructions
                .or(error_text)
                .unwrap_or("edit")
                .to_string(),
        ),
        diff_summary: changes.diff_summary(),
    };
    if let Err(e) = store.record_edit(&record).await {
        tracing::warn!(project_id = project.id, version, error = %e, "Failed to record edit");
    }

    tracing::info!(
        project_id = project.id,
        version_from = latest.number,
        version,
        changed_count = changed.len(),
        added = changes.added.len(),
        file_count = merged.len(),
        "Applied edit"
    );

    Ok(EditOutcome {
        project_id: project.id,
        version,
        changed_count: changed.len(),
        file_count: merged.len(),
        artifacts: merged
            .into_iter()
            .map(|(path, content)| SourceFile { path, content })
            .collect(),
    })
}
