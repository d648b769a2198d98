//! Repository for the `versions` table.

use forge_core::project::ProjectStatus;
use forge_core::types::DbId;
use sqlx::PgPool;

use crate::models::artifact::Artifact;
use crate::models::version::{CreateSnapshot, Version, VersionSnapshot};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, number, summary, created_at";

const ARTIFACT_COLUMNS: &str =
    "id, project_id, version_id, path, content, content_hash, created_at";

/// Provides version-management operations.
pub struct VersionRepo;

impl VersionRepo {
    /// Write a new version and its complete artifact set in one transaction.
    ///
    /// The number is `MAX(number) + 1` for the project (1 when none exist).
    /// No lock is taken: concurrent writers may both read the same maximum.
    /// The project's `updated_at` is bumped, and its status set to `ready`
    /// when `input.mark_ready` is set.
    pub async fn create_snapshot(
        pool: &PgPool,
        input: &CreateSnapshot,
    ) -> Result<VersionSnapshot, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let next_number: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(number), 0) + 1 FROM versions WHERE project_id = $1",
        )
        .bind(input.project_id)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO versions (project_id, number, summary)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let version = sqlx::query_as::<_, Version>(&query)
            .bind(input.project_id)
            .bind(next_number.0)
            .bind(&input.summary)
            .fetch_one(&mut *tx)
            .await?;

        let insert_artifact = format!(
            "INSERT INTO artifacts (project_id, version_id, path, content, content_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ARTIFACT_COLUMNS}"
        );
        let mut artifacts = Vec::with_capacity(input.artifacts.len());
        for artifact in &input.artifacts {
            let row = sqlx::query_as::<_, Artifact>(&insert_artifact)
                .bind(input.project_id)
                .bind(version.id)
                .bind(&artifact.path)
                .bind(&artifact.content)
                .bind(&artifact.content_hash)
                .fetch_one(&mut *tx)
                .await?;
            artifacts.push(row);
        }

        if input.mark_ready {
            sqlx::query("UPDATE projects SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(input.project_id)
                .bind(ProjectStatus::Ready.as_str())
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query("UPDATE projects SET updated_at = NOW() WHERE id = $1")
                .bind(input.project_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::debug!(
            project_id = input.project_id,
            version = version.number,
            file_count = artifacts.len(),
            "Snapshot committed"
        );
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(VersionSnapshot { version, artifacts })
    }

    /// Highest-numbered version of a project. Among duplicate numbers the
    /// most recently inserted row wins.
    pub async fn find_latest(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<Version>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM versions
             WHERE project_id = $1
             ORDER BY number DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Version>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_number(
        pool: &PgPool,
        project_id: DbId,
        number: i32,
    ) -> Result<Option<Version>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM versions
             WHERE project_id = $1 AND number = $2
             ORDER BY id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Version>(&query)
            .bind(project_id)
            .bind(number)
            .fetch_optional(pool)
            .await
    }

    /// List all versions for a project, ordered by number descending.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Version>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM versions
             WHERE project_id = $1
             ORDER BY number DESC, id DESC"
        );
        sqlx::query_as::<_, Version>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
