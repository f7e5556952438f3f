//! Retrieval-augmented generation pipeline.
//!
//! This crate stitches the corpus store, embedding providers, and the flat
//! vector index into the build-time half of the pipeline: seeding a corpus
//! and building a searchable index artifact. Query-time retrieval and answer
//! generation live in the `retrieval` and `generation` crates and are wired
//! together by the HTTP server.

pub mod config;
pub mod pipeline;

pub use config::{ConfigLoadError, PipelineConfig};
pub use pipeline::{build_index, seed_corpus, BuildReport, SeedReport, SAMPLE_DOCUMENTS};

pub use corpus::{CorpusManifest, Document, DocumentStore};
pub use embedding::EmbedConfig;
pub use index::{CompressionCodec, CompressionConfig, FlatIndex};

use thiserror::Error;

/// Errors from the build-time pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("corpus is empty; nothing to index")]
    EmptyCorpus,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("corpus failure: {0}")]
    Corpus(#[from] corpus::CorpusError),

    #[error("embedding failure: {0}")]
    Embedding(#[from] embedding::EmbedError),

    #[error("index failure: {0}")]
    Index(#[from] index::IndexError),

    #[error("embedding matrix has inconsistent shape: {0}")]
    Shape(String),
}
