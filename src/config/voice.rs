//! Voice provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// How call outcomes are produced.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceMode {
    /// No real phone call; a success is recorded after a short delay.
    #[default]
    Simulated,
    /// Calls are placed through the provider and polled until they end.
    Live,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    #[serde(default)]
    pub mode: VoiceMode,

    pub api_key: Option<Secret<String>>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    pub agent_id: Option<String>,

    /// Provider-side id of the outbound caller number
    pub phone_number_id: Option<String>,

    #[serde(default = "default_simulated_delay")]
    pub simulated_delay_secs: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Give up waiting for a live call after this many seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl VoiceConfig {
    pub fn is_live(&self) -> bool {
        self.mode == VoiceMode::Live
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_secs(self.simulated_delay_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Live mode needs credentials; simulated mode needs nothing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.is_live() {
            return Ok(());
        }
        if self
            .api_key
            .as_ref()
            .map_or(true, |k| k.expose_secret().is_empty())
        {
            return Err(ValidationError::MissingRequired("VOICE__API_KEY"));
        }
        if self.agent_id.as_deref().map_or(true, str::is_empty) {
            return Err(ValidationError::MissingRequired("VOICE__AGENT_ID"));
        }
        if self.phone_number_id.as_deref().map_or(true, str::is_empty) {
            return Err(ValidationError::MissingRequired("VOICE__PHONE_NUMBER_ID"));
        }
        if self.poll_interval_secs == 0 || self.poll_timeout_secs < self.poll_interval_secs {
            return Err(ValidationError::OutOfRange("voice.poll_interval_secs"));
        }
        Ok(())
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            mode: VoiceMode::default(),
            api_key: None,
            base_url: default_base_url(),
            agent_id: None,
            phone_number_id: None,
            simulated_delay_secs: default_simulated_delay(),
            poll_interval_secs: default_poll_interval(),
            poll_timeout_secs: default_poll_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_simulated_delay() -> u64 {
    5
}

fn default_poll_interval() -> u64 {
    3
}

fn default_poll_timeout() -> u64 {
    600
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_defaults_are_simulated() {
        let config = VoiceConfig::default();
        assert_eq!(config.mode, VoiceMode::Simulated);
        assert_eq!(config.simulated_delay(), Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.poll_timeout(), Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_live_mode_requires_credentials() {
        let config = VoiceConfig {
            mode: VoiceMode::Live,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("VOICE__API_KEY"))
        );

        let config = VoiceConfig {
            mode: VoiceMode::Live,
            api_key: Some(Secret::new("xi-key".to_string())),
            agent_id: Some("agent".to_string()),
            phone_number_id: Some("phone".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
