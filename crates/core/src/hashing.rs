//! Shared SHA-256 hex digest utility.
//!
//! Artifact hashes, dedup checks, and round-trip verification all go
//! through [`sha256_hex`] so the digest is computed one way everywhere.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}
