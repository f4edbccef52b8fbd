//! Language model configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// OpenAI-compatible chat completion settings and turn limits.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<Secret<String>>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries on transient upstream failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Prior messages sent with each turn
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Search tool invocations allowed per turn
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        use secrecy::ExposeSecret;
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("AI__API_KEY"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.history_window == 0 {
            return Err(ValidationError::OutOfRange("ai.history_window"));
        }
        if self.max_tool_iterations > 10 {
            return Err(ValidationError::OutOfRange("ai.max_tool_iterations"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            history_window: default_history_window(),
            max_tool_iterations: default_max_tool_iterations(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_history_window() -> usize {
    10
}

fn default_max_tool_iterations() -> usize {
    3
}
