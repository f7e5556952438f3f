use super::*;
use std::path::PathBuf;

use embedding::embed_batch;
use ndarray::Array2;
use tempfile::TempDir;

const DIMENSION: usize = 1536;

fn hash_config() -> EmbedConfig {
    EmbedConfig {
        provider: "hash".into(),
        model_name: "feature-hash".into(),
        dimension: DIMENSION,
        ..EmbedConfig::default()
    }
}

fn sample_texts() -> Vec<String> {
    [
        "FAISS is a library for efficient similarity search.",
        "LangChain helps build LLM-powered applications.",
        "RAG improves LLM responses.",
        "OpenAI released GPT-4 in 2023.",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Embed everything in the store and write the artifact + manifest pair the
/// way the index builder does.
async fn build_artifacts(
    dir: &TempDir,
    store: &DocumentStore,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    let cfg = hash_config();
    let documents = store.all_documents()?;
    let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();

    let vectors = embed_batch(&texts, &cfg).await?;
    let flat: Vec<f32> = vectors.into_iter().flatten().collect();
    let matrix = Array2::from_shape_vec((documents.len(), DIMENSION), flat)?;

    let mut index = FlatIndex::new(DIMENSION)?;
    index.add(matrix.view())?;
    let artifact_path = dir.path().join("vectors.bin");
    index.save(&artifact_path)?;

    let manifest = CorpusManifest::new(
        cfg.model_name.clone(),
        DIMENSION,
        documents.iter().map(|d| d.id).collect(),
    );
    let manifest_path = dir.path().join("manifest.json");
    manifest.save(&manifest_path)?;

    Ok((artifact_path, manifest_path))
}

async fn seeded_fixture(dir: &TempDir) -> anyhow::Result<(DocumentStore, PathBuf, PathBuf)> {
    let store = DocumentStore::open(dir.path().join("corpus.redb"))?;
    for text in sample_texts() {
        store.insert(&text)?;
    }
    let (artifact, manifest) = build_artifacts(dir, &store).await?;
    Ok((store, artifact, manifest))
}

fn open_retriever(
    store: DocumentStore,
    artifact: &Path,
    manifest: &Path,
    default_k: usize,
) -> Result<Retriever, RetrievalError> {
    Retriever::open(
        store,
        artifact,
        manifest,
        &CompressionConfig::default(),
        hash_config(),
        default_k,
    )
}

#[tokio::test]
async fn faiss_query_ranks_the_faiss_document_first() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (store, artifact, manifest) = seeded_fixture(&dir).await?;
    let retriever = open_retriever(store, &artifact, &manifest, 3)?;

    assert_eq!(retriever.index_size(), 4);
    assert_eq!(retriever.dimension(), DIMENSION);
    assert_eq!(retriever.model_name(), "feature-hash");

    let context = retriever.retrieve("What is FAISS?", Some(3)).await?;
    assert_eq!(context.query, "What is FAISS?");
    assert_eq!(context.documents.len(), 3);
    assert!(
        context.documents[0].text.contains("FAISS"),
        "closest document should describe FAISS, got: {}",
        context.documents[0].text
    );

    let ids: Vec<i64> = context.documents.iter().map(|d| d.document_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    for pair in context.documents.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
    Ok(())
}

#[tokio::test]
async fn default_k_applies_when_the_request_has_none() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (store, artifact, manifest) = seeded_fixture(&dir).await?;
    let retriever = open_retriever(store, &artifact, &manifest, 2)?;

    let context = retriever.retrieve("What is FAISS?", None).await?;
    assert_eq!(context.documents.len(), 2);
    Ok(())
}

#[tokio::test]
async fn oversized_k_returns_only_live_documents() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (store, artifact, manifest) = seeded_fixture(&dir).await?;
    let retriever = open_retriever(store, &artifact, &manifest, 3)?;

    let context = retriever.retrieve("similarity search", Some(10)).await?;
    assert_eq!(context.documents.len(), 4);
    assert!(context.documents.iter().all(|d| d.document_id > 0));
    Ok(())
}

#[tokio::test]
async fn empty_query_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (store, artifact, manifest) = seeded_fixture(&dir).await?;
    let retriever = open_retriever(store, &artifact, &manifest, 3)?;

    let err = retriever
        .retrieve("   ", None)
        .await
        .expect_err("whitespace query");
    match err {
        RetrievalError::InvalidQuery(msg) => assert!(msg.contains("query")),
        other => panic!("expected InvalidQuery, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn zero_k_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (store, artifact, manifest) = seeded_fixture(&dir).await?;
    let retriever = open_retriever(store, &artifact, &manifest, 3)?;

    let err = retriever
        .retrieve("What is FAISS?", Some(0))
        .await
        .expect_err("zero k");
    match err {
        RetrievalError::InvalidQuery(msg) => assert!(msg.contains("k")),
        other => panic!("expected InvalidQuery, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn deleted_document_makes_the_index_stale() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (store, artifact, manifest) = seeded_fixture(&dir).await?;

    // Drop the FAISS document after the build; its vector stays at offset 0.
    assert!(store.delete(1)?);
    let retriever = open_retriever(store, &artifact, &manifest, 3)?;

    let err = retriever
        .retrieve("What is FAISS?", Some(1))
        .await
        .expect_err("top hit maps to a deleted document");
    match err {
        RetrievalError::StaleIndex {
            offset,
            document_id,
        } => {
            assert_eq!(offset, 0);
            assert_eq!(document_id, Some(1));
        }
        other => panic!("expected StaleIndex, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn truncated_manifest_refuses_to_open() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (store, artifact, manifest_path) = seeded_fixture(&dir).await?;

    let short = CorpusManifest::new("feature-hash", DIMENSION, vec![1, 2, 3]);
    short.save(&manifest_path)?;

    let err = open_retriever(store, &artifact, &manifest_path, 3)
        .expect_err("manifest shorter than the index");
    match err {
        RetrievalError::ArtifactMismatch(msg) => {
            assert!(msg.contains("3"));
            assert!(msg.contains("4"));
        }
        other => panic!("expected ArtifactMismatch, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn mismatched_embedding_dimension_refuses_to_open() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (store, artifact, manifest) = seeded_fixture(&dir).await?;

    let narrow = EmbedConfig {
        dimension: 64,
        ..hash_config()
    };
    let err = Retriever::open(
        store,
        &artifact,
        &manifest,
        &CompressionConfig::default(),
        narrow,
        3,
    )
    .expect_err("embedding narrower than the index");
    match err {
        RetrievalError::ArtifactMismatch(msg) => assert!(msg.contains("dimension")),
        other => panic!("expected ArtifactMismatch, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn zero_default_k_refuses_to_open() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (store, artifact, manifest) = seeded_fixture(&dir).await?;

    let err = open_retriever(store, &artifact, &manifest, 0).expect_err("zero default_k");
    match err {
        RetrievalError::InvalidConfig(msg) => assert!(msg.contains("default_k")),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn missing_artifact_refuses_to_open() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = DocumentStore::open(dir.path().join("corpus.redb"))?;

    let err = open_retriever(
        store,
        &dir.path().join("absent.bin"),
        &dir.path().join("absent.json"),
        3,
    )
    .expect_err("no artifact on disk");
    assert!(matches!(
        err,
        RetrievalError::Index(index::IndexError::NotFound(_))
    ));
    Ok(())
}
