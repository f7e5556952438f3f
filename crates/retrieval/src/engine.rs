use std::path::Path;

use corpus::{CorpusManifest, DocumentStore};
use embedding::{embed_text, EmbedConfig};
use index::{CompressionConfig, FlatIndex};

use crate::types::{RetrievalContext, RetrievalError, RetrievedDoc};

#[cfg(test)]
mod tests;

/// Query-time retrieval engine.
///
/// Holds the loaded index, the manifest it was built with, and a handle to
/// the document store. Everything is loaded once at construction; `retrieve`
/// only reads, so one instance can serve concurrent request handlers.
#[derive(Debug)]
pub struct Retriever {
    store: DocumentStore,
    index: FlatIndex,
    manifest: CorpusManifest,
    embed_cfg: EmbedConfig,
    default_k: usize,
}

impl Retriever {
    /// Load the index artifact and manifest from disk and wire them to the
    /// document store.
    pub fn open(
        store: DocumentStore,
        artifact_path: &Path,
        manifest_path: &Path,
        compression: &CompressionConfig,
        embed_cfg: EmbedConfig,
        default_k: usize,
    ) -> Result<Self, RetrievalError> {
        let index = FlatIndex::load_with(artifact_path, compression)?;
        let manifest = CorpusManifest::load(manifest_path)?;
        Self::with_components(store, index, manifest, embed_cfg, default_k)
    }

    /// Assemble a retriever from already-loaded components.
    ///
    /// Cross-checks that the artifact, the manifest, and the embedding
    /// configuration all describe the same build. A service that fails these
    /// checks must not start: answering queries against mismatched artifacts
    /// returns wrong documents, not errors.
    pub fn with_components(
        store: DocumentStore,
        index: FlatIndex,
        manifest: CorpusManifest,
        embed_cfg: EmbedConfig,
        default_k: usize,
    ) -> Result<Self, RetrievalError> {
        embed_cfg.validate()?;
        if default_k == 0 {
            return Err(RetrievalError::InvalidConfig(
                "default_k must be greater than zero".into(),
            ));
        }
        if manifest.len() != index.size() {
            return Err(RetrievalError::ArtifactMismatch(format!(
                "manifest lists {} documents, index holds {} vectors",
                manifest.len(),
                index.size()
            )));
        }
        if manifest.dimension != index.dimension() {
            return Err(RetrievalError::ArtifactMismatch(format!(
                "manifest dimension {} does not match index dimension {}",
                manifest.dimension,
                index.dimension()
            )));
        }
        if embed_cfg.dimension != index.dimension() {
            return Err(RetrievalError::ArtifactMismatch(format!(
                "embedding dimension {} does not match index dimension {}",
                embed_cfg.dimension,
                index.dimension()
            )));
        }
        Ok(Self {
            store,
            index,
            manifest,
            embed_cfg,
            default_k,
        })
    }

    /// Number of vectors in the loaded index.
    pub fn index_size(&self) -> usize {
        self.index.size()
    }

    /// Dimension of the loaded index.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Embedding model recorded at build time.
    pub fn model_name(&self) -> &str {
        &self.manifest.embedding_model
    }

    /// `k` used when a request does not specify one.
    pub fn default_k(&self) -> usize {
        self.default_k
    }

    /// Retrieve the documents closest to `query`.
    ///
    /// `k` falls back to the configured default when `None`. Hits come back
    /// in ascending distance order; when the index holds fewer than `k`
    /// vectors the sentinel padding is dropped and only live documents are
    /// returned. An offset that no longer resolves to a stored document
    /// fails the whole request with [`RetrievalError::StaleIndex`] so a
    /// drifted corpus is never papered over with wrong documents.
    pub async fn retrieve(
        &self,
        query: &str,
        k: Option<usize>,
    ) -> Result<RetrievalContext, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::InvalidQuery(
                "query must not be empty".into(),
            ));
        }
        let k = k.unwrap_or(self.default_k);
        if k == 0 {
            return Err(RetrievalError::InvalidQuery(
                "k must be greater than zero".into(),
            ));
        }

        let vector = embed_text(query, &self.embed_cfg).await?;
        let hits = self.index.search(&vector, k)?;

        let mut documents = Vec::with_capacity(hits.len());
        for hit in hits {
            if hit.is_sentinel() {
                continue;
            }
            let document_id =
                self.manifest
                    .document_id(hit.offset)
                    .ok_or(RetrievalError::StaleIndex {
                        offset: hit.offset,
                        document_id: None,
                    })?;
            let document = self
                .store
                .get(document_id)?
                .ok_or(RetrievalError::StaleIndex {
                    offset: hit.offset,
                    document_id: Some(document_id),
                })?;
            documents.push(RetrievedDoc {
                document_id,
                distance: hit.distance,
                text: document.text,
            });
        }

        tracing::debug!(k, hits = documents.len(), "retrieval complete");
        Ok(RetrievalContext {
            query: query.to_string(),
            documents,
        })
    }
}
