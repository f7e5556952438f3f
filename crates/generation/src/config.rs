//! Generation provider configuration.

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};

/// Configuration for the answer-generation step.
///
/// Every field has a serde default, so a config file may specify only the
/// fields it wants to override. The API key is usually absent here and
/// injected from the environment by the pipeline config loader; a missing
/// key is therefore not a validation error, it fails at call time instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenConfig {
    /// Provider backend: `openai` or `echo`.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Chat model name sent to the API.
    #[serde(default = "default_model")]
    pub model: String,

    /// Chat-completions endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token for the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cap on generated tokens. `None` leaves it to the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature. `None` leaves it to the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_url: default_api_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_tokens: None,
            temperature: None,
        }
    }
}

impl GenConfig {
    /// Check the configuration for values that can never work.
    pub fn validate(&self) -> Result<(), GenerationError> {
        match self.provider.as_str() {
            "openai" | "echo" => {}
            other => {
                return Err(GenerationError::InvalidConfig(format!(
                    "provider must be `openai` or `echo`, got `{other}`"
                )))
            }
        }
        if self.model.trim().is_empty() {
            return Err(GenerationError::InvalidConfig(
                "model must not be empty".into(),
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(GenerationError::InvalidConfig(
                "api_url must not be empty".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(GenerationError::InvalidConfig(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        if let Some(max_tokens) = self.max_tokens {
            if max_tokens == 0 {
                return Err(GenerationError::InvalidConfig(
                    "max_tokens must be greater than zero".into(),
                ));
            }
        }
        if let Some(temperature) = self.temperature {
            if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
                return Err(GenerationError::InvalidConfig(
                    "temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }
        Ok(())
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}
