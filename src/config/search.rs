//! Place search configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub naver_client_id: Option<String>,

    pub naver_client_secret: Option<Secret<String>>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Results requested per query
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Shared cache; the in-process cache is used when unset
    pub redis_url: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl SearchConfig {
    /// Both Naver credentials are present.
    pub fn is_configured(&self) -> bool {
        self.naver_client_id.as_deref().is_some_and(|id| !id.is_empty())
            && self
                .naver_client_secret
                .as_ref()
                .is_some_and(|s| !s.expose_secret().is_empty())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.result_limit == 0 || self.result_limit > 5 {
            return Err(ValidationError::OutOfRange("search.result_limit"));
        }
        if let Some(url) = self.redis_url.as_deref().filter(|u| !u.is_empty()) {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(ValidationError::InvalidRedisUrl);
            }
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            naver_client_id: None,
            naver_client_secret: None,
            base_url: default_base_url(),
            result_limit: default_result_limit(),
            cache_ttl_secs: default_cache_ttl(),
            redis_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://openapi.naver.com".to_string()
}

fn default_result_limit() -> usize {
    5
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_timeout() -> u64 {
    5
}
