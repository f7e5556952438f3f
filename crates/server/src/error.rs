use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use embedding::EmbedError;
use generation::GenerationError;
use index::IndexError;
use retrieval::RetrievalError;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Corpus error: {0}")]
    Corpus(#[from] corpus::CorpusError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Retrieval(err) => match err {
                RetrievalError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                RetrievalError::StaleIndex { .. } => StatusCode::CONFLICT,
                RetrievalError::Embedding(
                    EmbedError::Provider { .. } | EmbedError::Network(_) | EmbedError::Timeout(_),
                ) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Generation(err) => match err {
                GenerationError::Api { .. }
                | GenerationError::Network(_)
                | GenerationError::Timeout(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Corpus(_) | ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code string
    pub(crate) fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Retrieval(err) => match err {
                RetrievalError::InvalidQuery(_) => "INVALID_QUERY",
                RetrievalError::StaleIndex { .. } => "STALE_INDEX",
                RetrievalError::Embedding(_) => "EMBEDDING_ERROR",
                RetrievalError::Index(IndexError::NotFound(_)) => "INDEX_NOT_FOUND",
                RetrievalError::Index(IndexError::Corrupt(_)) => "INDEX_CORRUPT",
                _ => "RETRIEVAL_ERROR",
            },
            ServerError::Generation(_) => "GENERATION_ERROR",
            ServerError::Corpus(_) => "CORPUS_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("JSON parse error: {err}"))
    }
}

impl From<ragline::ConfigLoadError> for ServerError {
    fn from(err: ragline::ConfigLoadError) -> Self {
        ServerError::Config(err.to_string())
    }
}
