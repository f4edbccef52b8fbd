//! HS256 JWT adapter for bearer token validation.
//!
//! Tokens are issued by the external identity provider and signed with a
//! shared secret. This adapter checks:
//!
//! 1. The HS256 signature
//! 2. Expiry (`exp`)
//! 3. Audience (`aud`), when one is configured
//! 4. A non-blank subject, which becomes the `UserId`
//!
//! # Example
//!
//! ```ignore
//! use wigvo::adapters::auth::{JwtConfig, JwtSessionValidator};
//! use wigvo::ports::SessionValidator;
//!
//! let validator = JwtSessionValidator::new(JwtConfig::new(secret).with_audience("authenticated"));
//! let user = validator.validate("eyJ...").await?;
//! ```

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Configuration for the JWT validator.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    secret: Secret<String>,
    /// Expected audience claim; `None` skips the audience check.
    pub audience: Option<String>,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Secret::new(secret.into()),
            audience: None,
            leeway_secs: 30,
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

/// JWT claims we read.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    #[serde(default)]
    email: Option<String>,
}

/// Session validator for HS256-signed access tokens.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match config.audience {
            Some(ref audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidAudience => {
                        tracing::warn!("Invalid audience in token");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::debug!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })?;

        let claims = token_data.claims;
        let user_id = UserId::new(&claims.sub).map_err(|_| {
            tracing::warn!("Token carries a blank subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.email))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("audience", &self.validation.aud)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret-with-enough-entropy";

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let validator = JwtSessionValidator::new(JwtConfig::new(SECRET));
        let jwt = token(
            json!({"sub": "user-123", "exp": future_exp(), "email": "a@b.kr"}),
            SECRET,
        );

        let user = validator.validate(&jwt).await.unwrap();

        assert_eq!(user.id.as_str(), "user-123");
        assert_eq!(user.email.as_deref(), Some("a@b.kr"));
    }

    #[tokio::test]
    async fn rejects_wrong_signature() {
        let validator = JwtSessionValidator::new(JwtConfig::new(SECRET));
        let jwt = token(json!({"sub": "user-123", "exp": future_exp()}), "other-secret");

        let result = validator.validate(&jwt).await;

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn reports_expired_token() {
        let validator = JwtSessionValidator::new(JwtConfig::new(SECRET).with_leeway(0));
        let expired = chrono::Utc::now().timestamp() - 3600;
        let jwt = token(json!({"sub": "user-123", "exp": expired}), SECRET);

        let result = validator.validate(&jwt).await;

        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn checks_audience_when_configured() {
        let validator =
            JwtSessionValidator::new(JwtConfig::new(SECRET).with_audience("authenticated"));
        let good = token(
            json!({"sub": "u", "exp": future_exp(), "aud": "authenticated"}),
            SECRET,
        );
        let bad = token(json!({"sub": "u", "exp": future_exp(), "aud": "anon"}), SECRET);

        assert!(validator.validate(&good).await.is_ok());
        assert_eq!(validator.validate(&bad).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn rejects_blank_subject() {
        let validator = JwtSessionValidator::new(JwtConfig::new(SECRET));
        let jwt = token(json!({"sub": "  ", "exp": future_exp()}), SECRET);

        assert_eq!(validator.validate(&jwt).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let validator = JwtSessionValidator::new(JwtConfig::new(SECRET));
        assert_eq!(validator.validate("not-a-jwt").await, Err(AuthError::InvalidToken));
    }

    #[test]
    fn jwt_validator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JwtSessionValidator>();
    }
}
