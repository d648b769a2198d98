//! Client for the external code-generation service.
//!
//! The service turns natural-language requirements into markdown that embeds
//! source files. This crate wraps its HTTP API behind the
//! [`GenerationService`] trait and provides [`StreamingParse`] for turning a
//! streamed response into a live artifact list.

pub mod client;
pub mod error;
pub mod stream;
pub mod types;

pub use client::{ByteStream, GenerationService, HttpGenerationService};
pub use error::GenerationError;
pub use stream::StreamingParse;
pub use types::{EditRequest, RefineRequest};
