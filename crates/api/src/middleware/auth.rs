//! Acting-user extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use forge_core::error::CoreError;
use forge_core::types::UserId;

use crate::auth::jwt::{insecure_subject, validate_token};
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::state::AppState;

/// How the acting user was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Signature-checked bearer token.
    Verified,
    /// Token subject read without verification (enforcement off only).
    Unverified,
    /// No usable credential; the configured development user.
    Fallback,
}

/// The user a request acts on behalf of.
///
/// With ownership enforcement on, only a verified bearer token is accepted.
/// With it off, an unverifiable token is still decoded for its subject, and
/// requests without one act as the development fallback user.
///
/// ```ignore
/// async fn my_handler(user: ActingUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ActingUser {
    pub user_id: UserId,
    pub identity: Identity,
}

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok());
        resolve_acting_user(header, &state.config.auth)
    }
}

/// Resolve the acting user from an `Authorization` header value.
pub fn resolve_acting_user(
    header: Option<&str>,
    config: &AuthConfig,
) -> Result<ActingUser, AppError> {
    let token = header.and_then(|h| h.strip_prefix("Bearer ")).map(str::trim);

    let verified = match (token, &config.jwt) {
        (Some(token), Some(jwt)) => validate_token(token, jwt)
            .ok()
            .and_then(|claims| claims.user_id()),
        _ => None,
    };
    if let Some(user_id) = verified {
        return Ok(ActingUser {
            user_id,
            identity: Identity::Verified,
        });
    }

    if config.require_auth_projects {
        let message = match (header, token) {
            (None, _) => "Missing Authorization header",
            (Some(_), None) => "Invalid Authorization format. Expected: Bearer <token>",
            (Some(_), Some(_)) => "Invalid or expired token",
        };
        return Err(AppError::Core(CoreError::Unauthorized(message.into())));
    }

    // Enforcement is off: accept an unverified subject before falling back.
    // TODO: decide whether unverified subjects should own projects at all, or
    // whether anonymous use should always map to the fallback user.
    if let Some(user_id) = token.and_then(insecure_subject) {
        tracing::debug!(%user_id, "Using unverified token subject");
        return Ok(ActingUser {
            user_id,
            identity: Identity::Unverified,
        });
    }

    Ok(ActingUser {
        user_id: config.dev_fallback_user_id,
        identity: Identity::Fallback,
    })
}
