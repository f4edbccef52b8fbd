//! Authentication configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Bearer token validation (HS256 shared secret with the identity provider).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: Option<Secret<String>>,

    /// Expected `aud` claim, unchecked when unset
    pub audience: Option<String>,

    /// Clock skew allowance in seconds
    #[serde(default)]
    pub leeway_secs: u64,
}

impl AuthConfig {
    pub fn has_secret(&self) -> bool {
        self.jwt_secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty())
    }

    /// A missing secret is tolerated outside production, where the server
    /// falls back to a development validator.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment == Environment::Production && !self.has_secret() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        Ok(())
    }
}
