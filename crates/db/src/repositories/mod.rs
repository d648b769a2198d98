//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod artifact_repo;
pub mod edit_record_repo;
pub mod project_repo;
pub mod version_repo;

pub use artifact_repo::ArtifactRepo;
pub use edit_record_repo::EditRecordRepo;
pub use project_repo::ProjectRepo;
pub use version_repo::VersionRepo;
