//! Concurrent retrieval over a shared retriever.
//!
//! The retriever is read-only after construction, so any number of tasks may
//! search it at once. These tests pin that down: concurrent results must be
//! byte-for-byte identical to sequential ones.

use std::sync::Arc;

use corpus::DocumentStore;
use ragline::{build_index, seed_corpus, PipelineConfig};
use retrieval::Retriever;
use tempfile::TempDir;

fn pipeline_config(dir: &TempDir) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.corpus.store_path = dir.path().join("corpus.redb");
    config.index.artifact_path = dir.path().join("index/vectors.bin");
    config.index.manifest_path = dir.path().join("index/manifest.json");
    config.embedding.provider = "hash".to_string();
    config.embedding.model_name = "feature-hash".to_string();
    config.embedding.dimension = 1536;
    config.generation.provider = "echo".to_string();
    config
}

async fn build_retriever(dir: &TempDir) -> Arc<Retriever> {
    let config = pipeline_config(dir);
    seed_corpus(&config).expect("seed");
    build_index(&config).await.expect("build");

    let store = DocumentStore::open(&config.corpus.store_path).expect("open store");
    let retriever = Retriever::open(
        store,
        &config.index.artifact_path,
        &config.index.manifest_path,
        &config.index.compression_config(),
        config.embedding.clone(),
        config.retrieval.default_k,
    )
    .expect("open retriever");
    Arc::new(retriever)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_queries_agree() {
    let dir = TempDir::new().expect("tempdir");
    let retriever = build_retriever(&dir).await;

    let baseline = retriever
        .retrieve("What is FAISS?", Some(3))
        .await
        .expect("baseline");

    let mut handles = Vec::new();
    for _ in 0..16 {
        let retriever = Arc::clone(&retriever);
        handles.push(tokio::spawn(async move {
            retriever.retrieve("What is FAISS?", Some(3)).await
        }));
    }

    for handle in handles {
        let context = handle.await.expect("task").expect("retrieve");
        assert_eq!(context, baseline);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mixed_queries_match_sequential_results() {
    let dir = TempDir::new().expect("tempdir");
    let retriever = build_retriever(&dir).await;

    let queries = [
        "What is FAISS?",
        "How do I build applications on language models?",
        "What does retrieval add to generation?",
        "When was GPT-4 released?",
    ];

    let mut expected = Vec::new();
    for query in queries {
        expected.push(
            retriever
                .retrieve(query, Some(2))
                .await
                .expect("sequential retrieve"),
        );
    }

    let mut handles = Vec::new();
    for (i, query) in queries.iter().copied().cycle().take(12).enumerate() {
        let retriever = Arc::clone(&retriever);
        let query = query.to_string();
        let handle = tokio::spawn(async move { retriever.retrieve(&query, Some(2)).await });
        handles.push((i % queries.len(), handle));
    }

    for (idx, handle) in handles {
        let context = handle.await.expect("task").expect("retrieve");
        assert_eq!(context, expected[idx]);
    }
}
