//! Domain logic for the artifact resolution engine.
//!
//! Everything in this crate is pure and synchronous: no I/O, no database,
//! no HTTP. The API and storage crates compose these pieces.

pub mod error;
pub mod file;
pub mod hashing;
pub mod markdown;
pub mod merge;
pub mod preview;
pub mod project;
pub mod relevance;
pub mod types;
