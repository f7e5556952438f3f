use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(json!({
        "status": "healthy",
        "service": "ragline-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime,
    }))
}

/// Readiness check endpoint
/// Returns 200 when the index is loaded and non-empty, 503 otherwise
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let index_size = state.retriever.index_size();
    let ready = index_size > 0;
    let (status, status_str) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Ok((
        status,
        Json(json!({
            "status": status_str,
            "service": "ragline-server",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "uptime_seconds": uptime,
            "components": {
                "api": "ready",
                "index": {
                    "vectors": index_size,
                    "dimension": state.retriever.dimension(),
                },
                "embedding_model": state.retriever.model_name(),
            }
        })),
    ))
}

/// Prometheus metrics endpoint
///
/// Renders the recorded counters and histograms in the Prometheus text
/// exposition format. Returns 404 when metrics are disabled.
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    match &state.metrics {
        Some(handle) => Ok(handle.render()),
        None => Err(ServerError::NotFound),
    }
}
