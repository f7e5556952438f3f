//! Configuration for embedding generation.

use crate::error::EmbedError;
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};

/// Configuration for embedding generation.
///
/// Every field carries a serde default, so the struct can sit inside a larger
/// config file and be only partially specified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Which provider produces vectors: `openai` (HTTP API) or `hash`
    /// (offline deterministic feature hashing).
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier sent to the API and recorded in the build manifest.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Width of produced vectors. Every provider response is checked against
    /// this value; a mismatch is a hard error, not a warning.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Embeddings endpoint for the `openai` provider.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key for the `openai` provider. Not written to config files; the
    /// loader fills it in from the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// L2-normalize produced vectors.
    #[serde(default = "default_normalize")]
    pub normalize: bool,

    /// How many texts are sent per API request.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// How many API requests may be in flight at once during a batch embed.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Capacity of the in-process query embedding cache. Zero disables it.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Retry behavior for transient API failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model_name: default_model_name(),
            dimension: default_dimension(),
            api_url: default_api_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            normalize: default_normalize(),
            max_batch_size: default_max_batch_size(),
            max_concurrency: default_max_concurrency(),
            cache_size: default_cache_size(),
            retry: RetryConfig::default(),
        }
    }
}

impl EmbedConfig {
    /// Validate invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), EmbedError> {
        match self.provider.as_str() {
            "openai" | "hash" => {}
            other => {
                return Err(EmbedError::InvalidConfig(format!(
                    "unknown provider `{other}`, expected `openai` or `hash`"
                )));
            }
        }
        if self.dimension == 0 {
            return Err(EmbedError::InvalidConfig(
                "dimension must be greater than zero".into(),
            ));
        }
        if self.model_name.is_empty() {
            return Err(EmbedError::InvalidConfig(
                "model_name must not be empty".into(),
            ));
        }
        if self.provider == "openai" && self.api_url.is_empty() {
            return Err(EmbedError::InvalidConfig("api_url must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(EmbedError::InvalidConfig(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        if self.max_batch_size == 0 {
            return Err(EmbedError::InvalidConfig(
                "max_batch_size must be greater than zero".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(EmbedError::InvalidConfig(
                "max_concurrency must be greater than zero".into(),
            ));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(EmbedError::InvalidConfig(
                "retry.backoff_multiplier must be at least 1.0".into(),
            ));
        }
        Ok(())
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model_name() -> String {
    "text-embedding-ada-002".to_string()
}

const fn default_dimension() -> usize {
    1536
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_normalize() -> bool {
    true
}

const fn default_max_batch_size() -> usize {
    64
}

const fn default_max_concurrency() -> usize {
    4
}

const fn default_cache_size() -> usize {
    256
}
