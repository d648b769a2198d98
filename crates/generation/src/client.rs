//! HTTP client for the generation service.
//!
//! Calls are made once: there is no retry and no timeout beyond what the
//! underlying [`reqwest::Client`] applies.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};

use crate::error::GenerationError;
use crate::types::{extract_markdown, EditRequest, RefineRequest, SessionRequest};

/// A streamed response body.
pub type ByteStream = BoxStream<'static, Result<Bytes, GenerationError>>;

/// Operations the API layer needs from the generation service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Request a partial edit. Returns the markdown describing changed files.
    async fn edit(&self, request: &EditRequest) -> Result<String, GenerationError>;

    /// Start full generation for a session and stream the markdown back.
    async fn generate_stream(&self, session_id: &str) -> Result<ByteStream, GenerationError>;

    /// Open a requirements conversation. The body is passed through untouched.
    async fn start_conversation(&self) -> Result<serde_json::Value, GenerationError>;

    /// Continue a requirements conversation. Once code has been generated the
    /// message is routed to the text-parsing endpoint instead.
    async fn refine(
        &self,
        request: &RefineRequest,
        has_generated: bool,
    ) -> Result<serde_json::Value, GenerationError>;
}

/// [`GenerationService`] over HTTP.
pub struct HttpGenerationService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGenerationService {
    /// * `base_url` - e.g. `http://localhost:8000`. A trailing `/` is dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or an
    /// [`GenerationError::ApiError`] carrying the status and body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_json(response: reqwest::Response) -> Result<serde_json::Value, GenerationError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<serde_json::Value>().await?)
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn edit(&self, request: &EditRequest) -> Result<String, GenerationError> {
        tracing::debug!(
            files = request.files.len(),
            indexed = request.file_paths.len(),
            "Requesting edit from generation service"
        );
        let response = self
            .client
            .post(self.url("edit"))
            .json(request)
            .send()
            .await?;

        let body = Self::ensure_success(response).await?.text().await?;
        let markdown = extract_markdown(&body);
        if markdown.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(markdown)
    }

    async fn generate_stream(&self, session_id: &str) -> Result<ByteStream, GenerationError> {
        let response = self
            .client
            .post(self.url("generate"))
            .json(&SessionRequest { session_id })
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes_stream().map_err(GenerationError::from).boxed())
    }

    async fn start_conversation(&self) -> Result<serde_json::Value, GenerationError> {
        let response = self
            .client
            .post(self.url("start-conversation"))
            .send()
            .await?;

        Self::parse_json(response).await
    }

    async fn refine(
        &self,
        request: &RefineRequest,
        has_generated: bool,
    ) -> Result<serde_json::Value, GenerationError> {
        let path = if has_generated { "parse-text" } else { "refine" };
        let response = self
            .client
            .post(self.url(path))
            .json(request)
            .send()
            .await?;

        Self::parse_json(response).await
    }
}
