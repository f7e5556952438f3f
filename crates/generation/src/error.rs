//! Error types for answer generation.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The configuration can never produce a working provider.
    #[error("invalid generation config: {0}")]
    InvalidConfig(String),

    /// The openai provider was selected but no API key is available.
    #[error("api_key is required for the openai provider")]
    MissingApiKey,

    /// The provider answered with a non-success HTTP status.
    #[error("generation API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("generation request timed out after {0:?}")]
    Timeout(Duration),

    /// The provider responded with a body we could not interpret.
    #[error("failed to parse generation response: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_the_details() {
        let err = GenerationError::Api {
            status: 429,
            message: "rate limited".into(),
        };
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("rate limited"));

        let timeout = GenerationError::Timeout(Duration::from_secs(60));
        assert!(timeout.to_string().contains("60"));
    }
}
