//! Error types for embedding generation.

use std::time::Duration;
use thiserror::Error;

/// Errors produced while turning text into vectors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbedError {
    /// The configuration is unusable: unknown provider, zero dimension,
    /// missing API key, and similar.
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),

    /// The provider answered with a non-success HTTP status.
    #[error("embedding provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    /// The request never completed: connect failure, reset, DNS.
    #[error("embedding request failed: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("embedding request timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered 2xx but the body was not an embedding response.
    #[error("failed to parse embedding response: {0}")]
    Parse(String),

    /// The provider returned a vector of the wrong width.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbedError {
    /// Whether retrying the request might succeed.
    ///
    /// Transport failures and throttling/server statuses are retryable.
    /// Config mistakes, parse failures, and dimension mismatches are not:
    /// the same request would fail the same way.
    pub fn is_retryable(&self) -> bool {
        match self {
            EmbedError::Network(_) | EmbedError::Timeout(_) => true,
            EmbedError::Provider { status, .. } => {
                matches!(status, 429 | 500 | 502 | 503 | 504 | 524)
            }
            _ => false,
        }
    }
}
