//! # Retrieval layer
//!
//! ## Purpose
//!
//! `retrieval` sits on top of the corpus store (`corpus`), the embedding
//! providers (`embedding`), and the flat vector index (`index`). It turns a
//! free-text query into an embedding, runs an exact nearest-neighbor search,
//! and resolves the resulting offsets back to document text through the
//! build manifest.
//!
//! In a typical deployment you will:
//! - Build the index artifact and manifest once from the corpus.
//! - Construct one [`Retriever`] at service startup; it loads both files,
//!   cross-checks them against each other and the embedding configuration,
//!   and refuses to start on any mismatch.
//! - Call [`Retriever::retrieve`] per query, sharing the retriever across
//!   request handlers.
//!
//! ## Core Types
//!
//! - [`Retriever`]: the query engine; cheap to call concurrently.
//! - [`RetrievalContext`]: query plus retrieved documents in ascending
//!   distance order.
//! - [`RetrievedDoc`]: one resolved hit with its id, distance, and text.
//! - [`RetrievalError`]: construction and query failures, including
//!   [`RetrievalError::StaleIndex`] when an index offset no longer maps to a
//!   live document.

pub mod engine;
pub mod types;

pub use crate::engine::Retriever;
pub use crate::types::{RetrievalContext, RetrievalError, RetrievedDoc};
