use uuid::Uuid;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret, which is required while project ownership is enforced.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). Edits wait on the
    /// generation service, so this is longer than a typical API timeout.
    pub request_timeout_secs: u64,
    pub auth: AuthConfig,
    /// Base URL of the generation service, without a trailing `/`.
    pub generation_url: String,
    /// Upper bound on files sent to the generation service per edit.
    pub relevance_max_files: usize,
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
}

/// How the acting user is established and whether ownership is enforced.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Verifies bearer tokens. `None` disables verification entirely.
    pub jwt: Option<JwtConfig>,
    /// When `true`, every project route needs a verified user and the
    /// project's owner must match.
    pub require_auth_projects: bool,
    /// Owner assigned to anonymous requests while enforcement is off.
    pub dev_fallback_user_id: Uuid,
}

/// Default generation service port when only a host is configured.
const DEFAULT_GENERATION_PORT: &str = "8000";

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `120`                      |
    /// | `REQUIRE_AUTH_PROJECTS` | `true`                     |
    /// | `DEV_FALLBACK_USER_ID`  | nil UUID                   |
    /// | `GENERATION_URL`        | from host and port         |
    /// | `GENERATION_HOST`       | `localhost`                |
    /// | `GENERATION_PORT`       | `8000`                     |
    /// | `RELEVANCE_MAX_FILES`   | `12`                       |
    /// | `DATABASE_URL`          | unset (in-memory store)    |
    ///
    /// # Panics
    ///
    /// Panics on malformed numbers or UUIDs, and when ownership is enforced
    /// but `JWT_SECRET` is missing.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let require_auth_projects =
            parse_enforcement_flag(std::env::var("REQUIRE_AUTH_PROJECTS").ok().as_deref());

        let dev_fallback_user_id: Uuid = std::env::var("DEV_FALLBACK_USER_ID")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse().expect("DEV_FALLBACK_USER_ID must be a UUID"))
            .unwrap_or(Uuid::nil());

        let jwt = JwtConfig::from_env_optional();
        assert!(
            jwt.is_some() || !require_auth_projects,
            "JWT_SECRET must be set while REQUIRE_AUTH_PROJECTS is enabled"
        );

        let generation_url = resolve_generation_url(
            std::env::var("GENERATION_URL").ok().as_deref(),
            std::env::var("GENERATION_HOST").ok().as_deref(),
            std::env::var("GENERATION_PORT").ok().as_deref(),
        );

        let relevance_max_files: usize = std::env::var("RELEVANCE_MAX_FILES")
            .unwrap_or_else(|_| forge_core::relevance::DEFAULT_MAX_FILES.to_string())
            .parse()
            .expect("RELEVANCE_MAX_FILES must be a valid usize");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            auth: AuthConfig {
                jwt,
                require_auth_projects,
                dev_fallback_user_id,
            },
            generation_url,
            relevance_max_files,
            database_url,
        }
    }
}

/// Enforcement is on unless the flag is literally `false` (any case).
pub fn parse_enforcement_flag(raw: Option<&str>) -> bool {
    raw.map(|v| !v.trim().eq_ignore_ascii_case("false"))
        .unwrap_or(true)
}

/// Work out the generation service base URL.
///
/// An explicit URL wins. A host that already carries a scheme is used as-is.
/// Otherwise any port in the host is discarded in favour of `port`.
pub fn resolve_generation_url(url: Option<&str>, host: Option<&str>, port: Option<&str>) -> String {
    if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }

    let host = host
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");
    let lower = host.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return host.trim_end_matches('/').to_string();
    }

    let host_part = host.split(':').next().unwrap_or(host);
    let port = port
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_GENERATION_PORT);
    format!("http://{host_part}:{port}")
}
