use corpus::CorpusError;
use embedding::EmbedError;
use index::IndexError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One retrieved document: its corpus id, squared L2 distance to the query,
/// and stored text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDoc {
    pub document_id: i64,
    pub distance: f32,
    pub text: String,
}

/// The result of one retrieval: the original query and its matching
/// documents in ascending distance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalContext {
    pub query: String,
    pub documents: Vec<RetrievedDoc>,
}

impl RetrievalContext {
    /// Document texts in retrieval order, ready for prompt assembly.
    pub fn texts(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.text.clone()).collect()
    }
}

/// Errors produced by the retrieval layer.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The retriever was constructed with values that can never work.
    #[error("invalid retrieval config: {0}")]
    InvalidConfig(String),
    /// The query input itself is unusable.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    /// Embedding the query failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),
    /// Index load or search failed.
    #[error("index error: {0}")]
    Index(#[from] IndexError),
    /// Corpus store or manifest access failed.
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),
    /// An index offset no longer maps to a live document. The index was
    /// built against a corpus state that has since changed; rebuild it.
    #[error("stale index: offset {offset} no longer maps to a live document")]
    StaleIndex {
        offset: i64,
        document_id: Option<i64>,
    },
    /// The index artifact, manifest, and embedding config disagree about
    /// what was built.
    #[error("artifact mismatch: {0}")]
    ArtifactMismatch(String),
}
