//! Text-to-vector embedding for the retrieval pipeline.
//!
//! Two providers, one call shape:
//!
//! - `openai`: POSTs to any OpenAI-compatible embeddings endpoint, with
//!   retries, bounded request concurrency, and a hard dimension check on
//!   every vector that comes back.
//! - `hash`: fully offline feature hashing. Deterministic, no network, no
//!   model files. Surprisingly serviceable for tests, CI, and development
//!   boxes that cannot reach an API.
//!
//! [`embed_text`] vectorizes a single query (with an LRU cache in front);
//! [`embed_batch`] vectorizes a whole corpus, preserving input order.

pub mod config;
pub mod error;
pub mod retry;

mod api;
mod cache;
mod hash;
mod normalize;
pub(crate) mod serde_millis;

pub use config::EmbedConfig;
pub use error::EmbedError;
pub use retry::RetryConfig;

use futures::stream::{self, StreamExt};

/// Embed one query string.
///
/// Cache first, then the configured provider. The returned vector always has
/// `cfg.dimension` entries.
pub async fn embed_text(text: &str, cfg: &EmbedConfig) -> Result<Vec<f32>, EmbedError> {
    cfg.validate()?;

    // --- Cache lookup ---
    let key = cache::cache_key(&cfg.provider, &cfg.model_name, text);
    if let Some(vector) = cache::lookup(&key, cfg.cache_size).await {
        return Ok(vector);
    }

    // --- Provider dispatch ---
    let vector = match cfg.provider.as_str() {
        "hash" => hash::hash_embedding(text, cfg),
        "openai" => {
            let texts = [text.to_string()];
            let mut vectors = api::embed_via_api(&texts, cfg).await?;
            vectors
                .pop()
                .ok_or_else(|| EmbedError::Parse("empty embedding response".into()))?
        }
        other => {
            return Err(EmbedError::InvalidConfig(format!(
                "unknown provider `{other}`"
            )));
        }
    };

    cache::store(key, vector.clone(), cfg.cache_size).await;
    Ok(vector)
}

/// Embed a batch of texts, preserving input order.
///
/// The batch is cut into `max_batch_size` chunks; up to `max_concurrency`
/// chunks are in flight at once for the API provider. `output[i]` always
/// embeds `texts[i]`.
pub async fn embed_batch(texts: &[String], cfg: &EmbedConfig) -> Result<Vec<Vec<f32>>, EmbedError> {
    cfg.validate()?;
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    match cfg.provider.as_str() {
        "hash" => Ok(texts
            .iter()
            .map(|text| hash::hash_embedding(text, cfg))
            .collect()),
        "openai" => {
            let chunk_futures = texts
                .chunks(cfg.max_batch_size)
                .map(|chunk| api::embed_via_api(chunk, cfg));
            let chunk_results: Vec<Result<Vec<Vec<f32>>, EmbedError>> = stream::iter(chunk_futures)
                .buffered(cfg.max_concurrency)
                .collect()
                .await;

            let mut vectors = Vec::with_capacity(texts.len());
            for result in chunk_results {
                vectors.extend(result?);
            }
            Ok(vectors)
        }
        other => Err(EmbedError::InvalidConfig(format!(
            "unknown provider `{other}`"
        ))),
    }
}
