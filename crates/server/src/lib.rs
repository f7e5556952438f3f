//! Ragline Server - HTTP API for retrieval-augmented question answering
//!
//! This crate provides the HTTP server that exposes the ragline pipeline
//! over a small REST surface. It supports:
//!
//! - **Query Answering**: embed a question, retrieve the nearest documents,
//!   and generate an answer grounded in them
//! - **Health & Metrics**: liveness/readiness probes and Prometheus-compatible
//!   metrics
//!
//! # Features
//!
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: Structured error responses with stable error codes
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - Service information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (503 until the index holds vectors)
//! - `GET /metrics` - Prometheus metrics (404 when disabled)
//! - `POST /query` - Answer a question over the indexed corpus
//!
//! The server expects the index artifacts to exist before startup; build
//! them with `ragline init` followed by `ragline build`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
