//! Error types produced by the corpus crate.
//!
//! All errors are typed so callers can distinguish a missing manifest (the
//! index was never built) from a corrupt one, and map each case to its own
//! HTTP status or exit path.

use thiserror::Error;

/// Errors that can occur while reading or writing corpus state.
///
/// The enum is marked `#[non_exhaustive]` to allow future additions without
/// breaking existing code. Callers should always include a catch-all arm when
/// matching.
///
/// # Examples
///
/// ```rust
/// use corpus::CorpusError;
///
/// let err = CorpusError::ManifestNotFound("data/index/manifest.json".to_string());
/// assert!(err.to_string().contains("manifest.json"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CorpusError {
    /// The underlying key-value store rejected an operation.
    #[error("storage backend error: {0}")]
    Storage(String),

    /// A document could not be serialized for storage.
    #[error("failed to encode document: {0}")]
    Encode(String),

    /// A stored document could not be deserialized. Usually means the store
    /// was written by an incompatible version.
    #[error("failed to decode document: {0}")]
    Decode(String),

    /// The build manifest does not exist. Either the index has never been
    /// built or its artifacts were removed.
    #[error("manifest not found: {0}")]
    ManifestNotFound(String),

    /// The build manifest exists but could not be parsed or fails validation.
    #[error("manifest invalid: {0}")]
    ManifestInvalid(String),

    /// Filesystem error while reading or writing the manifest.
    #[error("manifest io error: {0}")]
    ManifestIo(String),
}

impl CorpusError {
    /// Wrap any displayable backend error as a [`CorpusError::Storage`].
    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_helper_preserves_message() {
        let err = CorpusError::storage("disk full");
        assert_eq!(err, CorpusError::Storage("disk full".to_string()));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn display_messages_name_the_failure() {
        let cases = [
            (
                CorpusError::Encode("bad field".into()),
                "failed to encode document",
            ),
            (
                CorpusError::Decode("short input".into()),
                "failed to decode document",
            ),
            (
                CorpusError::ManifestNotFound("m.json".into()),
                "manifest not found",
            ),
            (
                CorpusError::ManifestInvalid("version 9".into()),
                "manifest invalid",
            ),
        ];
        for (err, needle) in cases {
            assert!(
                err.to_string().contains(needle),
                "{err} should mention {needle}"
            );
        }
    }
}
