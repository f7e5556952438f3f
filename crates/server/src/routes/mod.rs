//! API route handlers
//!
//! This module contains all HTTP endpoint implementations for the ragline
//! server. Routes are organized by functionality:
//!
//! - `health`: Health checks, readiness, and metrics
//! - `query`: Retrieval-augmented question answering

pub mod health;
pub mod query;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and requires no authentication.
///
/// # Response
///
/// ```json
/// {
///   "service": "ragline-server",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "service": "ragline-server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/query",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
