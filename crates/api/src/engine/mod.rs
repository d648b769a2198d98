//! Save and edit orchestration.
//!
//! Handlers deal with HTTP and identity; the functions here sequence the
//! parser, relevance selector, generation service, merge, and store.

pub mod access;
pub mod edit;
pub mod save;
