/// Errors from the generation service client.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Generation service error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered successfully but with no markdown.
    #[error("Generation service returned an empty response")]
    EmptyResponse,

    #[error("Invalid response body: {0}")]
    Json(#[from] serde_json::Error),
}
