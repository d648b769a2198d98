//! Bearer token validation.
//!
//! Tokens are HS256 JWTs issued by the identity provider; the `sub` claim is
//! the user's UUID. This service never issues tokens itself.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims read from an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's UUID.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        self.sub.parse().ok()
    }
}

/// Configuration for token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the identity provider.
    pub secret: String,
}

impl JwtConfig {
    /// Read `JWT_SECRET`. Returns `None` when it is unset or empty.
    pub fn from_env_optional() -> Option<Self> {
        std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|secret| Self { secret })
    }
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration. The audience is not checked:
/// provider tokens carry one this service has no opinion on.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default(); // HS256, validates exp
    validation.validate_aud = false;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// Read the subject of a token WITHOUT verifying it.
///
/// Only consulted while ownership enforcement is disabled, to attribute
/// projects to whoever the client claims to be. The result must never be
/// trusted for access control.
pub fn insecure_subject(token: &str) -> Option<Uuid> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.user_id())
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        }
    }

    fn token(sub: &str, secret: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_round_trips() {
        let user = Uuid::new_v4();
        let config = test_config();
        let claims = validate_token(&token(&user.to_string(), &config.secret, 600), &config).unwrap();
        assert_eq!(claims.user_id(), Some(user));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let forged = token(&Uuid::new_v4().to_string(), "some-other-secret", 600);
        assert!(validate_token(&forged, &config).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let expired = token(&Uuid::new_v4().to_string(), &config.secret, -3600);
        assert!(validate_token(&expired, &config).is_err());
    }

    #[test]
    fn insecure_subject_ignores_signature_and_expiry() {
        let user = Uuid::new_v4();
        let forged = token(&user.to_string(), "whatever", -3600);
        assert_eq!(insecure_subject(&forged), Some(user));
        assert_eq!(insecure_subject("not-a-jwt"), None);
        assert_eq!(insecure_subject(&token("not-a-uuid", "x", 600)), None);
    }
}
