//! Repository for the `edit_records` table.

use forge_core::types::DbId;
use sqlx::PgPool;

use crate::models::edit_record::{CreateEditRecord, EditRecord};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, project_id, version_from, version_to, prompt, diff_summary, created_at";

pub struct EditRecordRepo;

impl EditRecordRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateEditRecord,
    ) -> Result<EditRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO edit_records (project_id, version_from, version_to, prompt, diff_summary)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EditRecord>(&query)
            .bind(input.project_id)
            .bind(input.version_from)
            .bind(input.version_to)
            .bind(&input.prompt)
            .bind(&input.diff_summary)
            .fetch_one(pool)
            .await
    }

    /// Edit history of a project, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<EditRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edit_records
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, EditRecord>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
