//! Live parsing of a streamed generation response.
//!
//! Every chunk is appended to the buffer and the whole buffer is parsed
//! again. The artifact list after the last chunk is exactly what a single
//! parse of the complete response would produce.

use forge_core::markdown::{self, ParsedArtifact};

#[derive(Debug, Default)]
pub struct StreamingParse {
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    artifacts: Vec<ParsedArtifact>,
}

impl StreamingParse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and re-parse everything received so far.
    ///
    /// Returns `true` when the artifact list changed.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        self.decode(chunk);
        let parsed = markdown::parse_blocks(&self.buffer);
        if parsed == self.artifacts {
            return false;
        }
        self.artifacts = parsed;
        true
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Complete files seen so far.
    pub fn artifacts(&self) -> &[ParsedArtifact] {
        &self.artifacts
    }

    /// Final parse of the full response, with the parser's single-file
    /// fallback when no blocks were found.
    pub fn finish(mut self) -> Vec<ParsedArtifact> {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }
        if self.buffer.trim().is_empty() {
            return Vec::new();
        }
        markdown::parse(&self.buffer)
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Sequence split across chunks: wait for the rest.
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }
}
