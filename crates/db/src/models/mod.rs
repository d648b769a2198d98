//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and the DTOs used to insert it.

pub mod artifact;
pub mod edit_record;
pub mod project;
pub mod version;
