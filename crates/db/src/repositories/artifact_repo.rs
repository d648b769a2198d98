//! Repository for the `artifacts` table.
//!
//! Artifacts are only ever written as part of a version snapshot; see
//! [`crate::repositories::VersionRepo::create_snapshot`].

use forge_core::types::DbId;
use sqlx::PgPool;

use crate::models::artifact::Artifact;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, version_id, path, content, content_hash, created_at";

pub struct ArtifactRepo;

impl ArtifactRepo {
    /// Every artifact of one version, ordered by path.
    pub async fn list_by_version(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<Vec<Artifact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM artifacts WHERE version_id = $1 ORDER BY path ASC"
        );
        sqlx::query_as::<_, Artifact>(&query)
            .bind(version_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_version(pool: &PgPool, version_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM artifacts WHERE version_id = $1")
            .bind(version_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
