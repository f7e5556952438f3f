//! Build-time pipeline operations: corpus seeding and index construction.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use corpus::{CorpusManifest, DocumentStore};
use embedding::embed_batch;
use index::FlatIndex;
use ndarray::Array2;

use crate::config::PipelineConfig;
use crate::PipelineError;

/// Sample documents seeded by `ragline init` into an empty corpus.
pub const SAMPLE_DOCUMENTS: [&str; 4] = [
    "FAISS is a library for efficient similarity search.",
    "LangChain helps build LLM-powered applications.",
    "RAG improves LLM responses.",
    "OpenAI released GPT-4 in 2023.",
];

/// Outcome of a corpus seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Documents inserted by this run.
    pub inserted: usize,
    /// Documents that were already in the store.
    pub existing: usize,
}

/// Outcome of an index build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Number of documents indexed.
    pub documents: usize,
    /// Vector dimension of the artifact.
    pub dimension: usize,
    /// Wall-clock build duration.
    pub elapsed: Duration,
    /// Build completion time recorded in the manifest.
    pub built_at: DateTime<Utc>,
}

/// Open the corpus store and seed [`SAMPLE_DOCUMENTS`] when it is empty.
///
/// A non-empty store is left untouched, so running `init` twice is safe.
pub fn seed_corpus(config: &PipelineConfig) -> Result<SeedReport, PipelineError> {
    config.validate()?;
    let store = DocumentStore::open(&config.corpus.store_path)?;

    let existing = store.len()? as usize;
    if existing > 0 {
        tracing::info!(documents = existing, "corpus already seeded");
        return Ok(SeedReport {
            inserted: 0,
            existing,
        });
    }

    for text in SAMPLE_DOCUMENTS {
        store.insert(text)?;
    }
    tracing::info!(
        documents = SAMPLE_DOCUMENTS.len(),
        path = %config.corpus.store_path.display(),
        "corpus seeded"
    );
    Ok(SeedReport {
        inserted: SAMPLE_DOCUMENTS.len(),
        existing: 0,
    })
}

/// Build the vector index from every document in the corpus store.
///
/// Embeds all documents, assembles the flat index, and atomically writes the
/// artifact and its manifest. Offset `i` in the artifact always corresponds
/// to the `i`-th document in id order; the manifest records that mapping.
/// Nothing is written until every embedding has been collected, so a failed
/// build never leaves partial artifacts behind.
pub async fn build_index(config: &PipelineConfig) -> Result<BuildReport, PipelineError> {
    config.validate()?;
    let start = Instant::now();

    let store = DocumentStore::open(&config.corpus.store_path)?;
    let documents = store.all_documents()?;
    if documents.is_empty() {
        return Err(PipelineError::EmptyCorpus);
    }
    tracing::info!(
        documents = documents.len(),
        model = %config.embedding.model_name,
        "embedding corpus"
    );

    let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
    let embeddings = embed_batch(&texts, &config.embedding).await?;

    let dimension = config.embedding.dimension;
    let mut flat = Vec::with_capacity(embeddings.len() * dimension);
    for vector in &embeddings {
        flat.extend_from_slice(vector);
    }
    let matrix = Array2::from_shape_vec((embeddings.len(), dimension), flat)
        .map_err(|e| PipelineError::Shape(e.to_string()))?;

    let mut index = FlatIndex::new(dimension)?;
    index.add(matrix.view())?;
    index.save_with(
        &config.index.artifact_path,
        &config.index.compression_config(),
    )?;

    let entries: Vec<i64> = documents.iter().map(|d| d.id).collect();
    let manifest = CorpusManifest::new(config.embedding.model_name.clone(), dimension, entries);
    manifest.save(&config.index.manifest_path)?;

    let report = BuildReport {
        documents: documents.len(),
        dimension,
        elapsed: start.elapsed(),
        built_at: manifest.built_at,
    };
    tracing::info!(
        documents = report.documents,
        dimension = report.dimension,
        elapsed_ms = report.elapsed.as_millis() as u64,
        artifact = %config.index.artifact_path.display(),
        "index built"
    );
    Ok(report)
}
