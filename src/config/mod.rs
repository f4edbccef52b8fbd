//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables carry the `WIGVO` prefix and
//! nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use wigvo::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod auth;
mod database;
mod error;
mod search;
mod server;
mod voice;

pub use ai::AiConfig;
pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use search::SearchConfig;
pub use server::{Environment, ServerConfig};
pub use voice::{VoiceConfig, VoiceMode};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads; `validate`
/// then reports what a runnable server is still missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL; in-memory repositories when the URL is empty
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Chat completion provider
    #[serde(default)]
    pub ai: AiConfig,

    /// Outbound calling
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Naver local search and its cache
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `WIGVO` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `WIGVO__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `WIGVO__VOICE__MODE=live` -> `voice.mode = live`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("WIGVO")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first section that is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.ai.validate()?;
        self.voice.validate()?;
        self.search.validate()?;
        self.auth.validate(&self.server.environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; tests touching them run one at a time.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 7] = [
        "WIGVO__AI__API_KEY",
        "WIGVO__SERVER__PORT",
        "WIGVO__SERVER__ENVIRONMENT",
        "WIGVO__VOICE__MODE",
        "WIGVO__VOICE__SIMULATED_DELAY_SECS",
        "WIGVO__DATABASE__URL",
        "WIGVO__AUTH__JWT_SECRET",
    ];

    fn set_minimal_env() {
        env::set_var("WIGVO__AI__API_KEY", "sk-test");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.api_key.unwrap().expose_secret(), "sk-test");
        assert!(!config.database.is_configured());
    }

    #[test]
    fn test_minimal_config_validates() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.voice.mode, VoiceMode::Simulated);
        assert_eq!(config.ai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        set_minimal_env();
        env::set_var("WIGVO__SERVER__PORT", "3000");
        env::set_var("WIGVO__VOICE__MODE", "live");
        env::set_var("WIGVO__VOICE__SIMULATED_DELAY_SECS", "1");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.voice.mode, VoiceMode::Live);
        assert_eq!(config.voice.simulated_delay_secs, 1);
        // Live mode without provider credentials
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_jwt_secret() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        set_minimal_env();
        env::set_var("WIGVO__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }
}
