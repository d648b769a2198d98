#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use forge_api::auth::jwt::{Claims, JwtConfig};
use forge_api::config::{AuthConfig, ServerConfig};
use forge_api::router::build_app_router;
use forge_api::state::AppState;
use forge_db::MemoryStore;
use forge_generation::{
    ByteStream, EditRequest, GenerationError, GenerationService, RefineRequest,
};

pub const TEST_SECRET: &str = "test-secret-for-integration-tests";

/// Owner of anonymous requests while enforcement is off.
pub fn fallback_user() -> Uuid {
    Uuid::from_u128(0xF00D)
}

pub fn alice() -> Uuid {
    Uuid::from_u128(0xA11CE)
}

pub fn bob() -> Uuid {
    Uuid::from_u128(0xB0B)
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(require_auth_projects: bool) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        auth: AuthConfig {
            jwt: Some(JwtConfig {
                secret: TEST_SECRET.to_string(),
            }),
            require_auth_projects,
            dev_fallback_user_id: fallback_user(),
        },
        generation_url: "http://generation.invalid".to_string(),
        relevance_max_files: 12,
        database_url: None,
    }
}

/// Sign a token for `user` with the test secret.
pub fn token_for(user: Uuid) -> String {
    let claims = Claims {
        sub: user.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Scripted generation service
// ---------------------------------------------------------------------------

/// A [`GenerationService`] that replays queued answers and records requests.
#[derive(Default)]
pub struct FakeGeneration {
    edits: Mutex<VecDeque<Result<String, GenerationError>>>,
    requests: Mutex<Vec<EditRequest>>,
    stream: Mutex<Vec<&'static str>>,
    refines: Mutex<Vec<(String, bool)>>,
}

impl FakeGeneration {
    /// Queue the markdown returned by the next edit call.
    pub fn push_edit(&self, markdown: &str) {
        self.edits.lock().unwrap().push_back(Ok(markdown.to_string()));
    }

    pub fn push_edit_error(&self, err: GenerationError) {
        self.edits.lock().unwrap().push_back(Err(err));
    }

    /// Chunks streamed by the next generate call.
    pub fn set_stream(&self, chunks: Vec<&'static str>) {
        *self.stream.lock().unwrap() = chunks;
    }

    pub fn edit_requests(&self) -> Vec<EditRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn refines(&self) -> Vec<(String, bool)> {
        self.refines.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for FakeGeneration {
    async fn edit(&self, request: &EditRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        self.edits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyResponse))
    }

    async fn generate_stream(&self, _session_id: &str) -> Result<ByteStream, GenerationError> {
        let chunks: Vec<Result<Bytes, GenerationError>> = self
            .stream
            .lock()
            .unwrap()
            .iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }

    async fn start_conversation(&self) -> Result<serde_json::Value, GenerationError> {
        Ok(serde_json::json!({ "session_id": "session-1", "message": "What are we building?" }))
    }

    async fn refine(
        &self,
        request: &RefineRequest,
        has_generated: bool,
    ) -> Result<serde_json::Value, GenerationError> {
        self.refines
            .lock()
            .unwrap()
            .push((request.message.clone(), has_generated));
        Ok(serde_json::json!({ "session_id": request.session_id, "reply": "noted" }))
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub generation: Arc<FakeGeneration>,
}

/// Build the full application router over an in-memory store.
pub fn build_test_app(require_auth_projects: bool) -> TestApp {
    build_test_app_with(test_config(require_auth_projects))
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let generation = Arc::new(FakeGeneration::default());
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::clone(&generation) as Arc<dyn GenerationService>,
        config.clone(),
    );
    TestApp {
        router: build_app_router(state, &config),
        generation,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Save `markdown` as a new project titled `title`; returns the project id.
pub async fn create_saved_project(
    app: &Router,
    token: Option<&str>,
    title: &str,
    markdown: &str,
) -> i64 {
    let response = post_json(
        app,
        "/api/v1/projects/save",
        token,
        serde_json::json!({ "title": title, "markdown": markdown }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["data"]["project_id"]
        .as_i64()
        .unwrap()
}

/// Render one file in the heading + fenced block format.
pub fn file_block(path: &str, content: &str) -> String {
    format!("#### {path}\n```\n{content}\n```\n")
}
