//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (request IDs, logging, timeout, compression, CORS)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{log_requests, request_id};
use crate::routes::{api_info, not_found};
use crate::routes::{health, query};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Routes:
/// - `GET /` - service info
/// - `GET /health` - liveness probe
/// - `GET /ready` - readiness probe (503 until the index holds vectors)
/// - `GET /metrics` - Prometheus exposition (404 when disabled)
/// - `POST /query` - retrieval-augmented question answering
///
/// Middleware stack (applied in reverse order):
/// 1. Request ID tracking
/// 2. Request logging
/// 3. Timeout handling
/// 4. Compression
/// 5. CORS
pub fn build_router(state: Arc<ServerState>) -> Router {
    // CORS layer
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/query", post(query::query))
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .fallback(not_found)
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the ragline HTTP server
///
/// Initializes the server with the provided configuration and starts
/// listening for incoming HTTP requests. This function blocks until the
/// server is shut down via SIGTERM or Ctrl+C.
///
/// Startup loads the pipeline config, opens the corpus store, and loads the
/// index artifact and manifest; any missing or mismatched artifact fails
/// here, before the socket is bound.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Create server state
    let state = Arc::new(ServerState::new(config.clone())?);

    tracing::info!(
        "Loaded index: {} vectors at dimension {} (model {})",
        state.retriever.index_size(),
        state.retriever.dimension(),
        state.retriever.model_name()
    );

    // Build router
    let app = build_router(state);

    // Parse bind address
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting ragline server on {} (pipeline config: {})",
        addr,
        config.pipeline_config.display()
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB, Max concurrent queries: {}",
        config.timeout_secs,
        config.max_body_size_mb,
        config.max_concurrent_queries
    );
    tracing::info!(
        "CORS: {}, Metrics: {}",
        config.enable_cors,
        config.metrics_enabled
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
