//! Repository for the `projects` table.

use forge_core::project::ProjectStatus;
use forge_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProjectSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, title, status, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project in `draft` status, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (owner_id, title, status)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.owner_id)
            .bind(&input.title)
            .bind(ProjectStatus::Draft.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's projects, most recently updated first, each with the
    /// number of its latest version (if any).
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: UserId,
        limit: i64,
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProjectSummary>(
            "SELECT p.id, p.owner_id, p.title, p.status, p.created_at, p.updated_at, \
                    (SELECT MAX(v.number) FROM versions v WHERE v.project_id = p.id) AS latest_version \
             FROM projects p \
             WHERE p.owner_id = $1 \
             ORDER BY p.updated_at DESC \
             LIMIT $2",
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Delete a project and everything it owns: artifacts, edit records,
    /// versions, then the project row, in one transaction.
    ///
    /// Returns `true` if the project row was removed.
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM artifacts WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM edit_records WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM versions WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
