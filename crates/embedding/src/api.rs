//! OpenAI-compatible embeddings API provider.
//!
//! One request carries up to `max_batch_size` texts; the response must hold
//! exactly one vector per input text, each of the configured dimension.

use crate::config::EmbedConfig;
use crate::error::EmbedError;
use crate::normalize::l2_normalize_in_place;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::time::Duration;

/// Shared HTTP client so connection pooling works across requests.
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(32)
        .build()
        .expect("Failed to build HTTP client")
});

/// Longest provider error body kept verbatim in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Embed a batch of texts through the configured API endpoint.
///
/// Transient failures are retried per `cfg.retry`; non-retryable errors
/// (authentication, validation, malformed bodies) surface immediately.
pub(crate) async fn embed_via_api(
    texts: &[String],
    cfg: &EmbedConfig,
) -> Result<Vec<Vec<f32>>, EmbedError> {
    let api_key = cfg.api_key.as_deref().ok_or_else(|| {
        EmbedError::InvalidConfig("api_key is required for the openai provider".into())
    })?;
    let payload = json!({
        "input": texts,
        "model": cfg.model_name,
    });

    let mut attempt = 0u32;
    let body = loop {
        match send_api_request(cfg, api_key, &payload).await {
            Ok(body) => break body,
            Err(err) => {
                if !err.is_retryable() || attempt >= cfg.retry.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = cfg.retry.calculate_delay(attempt);
                tracing::warn!(
                    attempt,
                    max_retries = cfg.retry.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "embedding request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    };

    let vectors = parse_embeddings(&body, texts.len())?;
    let mut out = Vec::with_capacity(vectors.len());
    for mut vector in vectors {
        if vector.len() != cfg.dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: cfg.dimension,
                actual: vector.len(),
            });
        }
        if cfg.normalize {
            l2_normalize_in_place(&mut vector);
        }
        out.push(vector);
    }
    Ok(out)
}

/// POST the payload once, classifying transport and status failures.
async fn send_api_request(
    cfg: &EmbedConfig,
    api_key: &str,
    payload: &Value,
) -> Result<Value, EmbedError> {
    let response = HTTP_CLIENT
        .post(&cfg.api_url)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {api_key}"))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .json(payload)
        .send()
        .await
        .map_err(|e| classify_transport_error(&e, cfg.timeout_secs))?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(EmbedError::Provider {
            status: status.as_u16(),
            message: truncate_message(&message),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| EmbedError::Parse(e.to_string()))
}

fn classify_transport_error(e: &reqwest::Error, timeout_secs: u64) -> EmbedError {
    if e.is_timeout() {
        EmbedError::Timeout(Duration::from_secs(timeout_secs))
    } else {
        EmbedError::Network(e.to_string())
    }
}

/// Error bodies can be arbitrarily large; keep just enough to diagnose.
fn truncate_message(message: &str) -> String {
    if message.len() <= MAX_ERROR_BODY {
        return message.trim().to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", message[..end].trim())
}

/// Extract embedding vectors from an OpenAI-style response body.
///
/// The `data` array may arrive out of input order; entries are slotted by
/// their `index` field when present.
fn parse_embeddings(body: &Value, expected: usize) -> Result<Vec<Vec<f32>>, EmbedError> {
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| EmbedError::Parse("response has no `data` array".into()))?;
    if data.len() != expected {
        return Err(EmbedError::Parse(format!(
            "expected {expected} embeddings, response carries {}",
            data.len()
        )));
    }

    let mut vectors: Vec<Option<Vec<f32>>> = vec![None; expected];
    for (position, item) in data.iter().enumerate() {
        let slot = item
            .get("index")
            .and_then(Value::as_u64)
            .map(|i| i as usize)
            .unwrap_or(position);
        if slot >= expected {
            return Err(EmbedError::Parse(format!(
                "embedding index {slot} out of range"
            )));
        }
        let vector = parse_embedding_vector(item)?;
        if vectors[slot].replace(vector).is_some() {
            return Err(EmbedError::Parse(format!(
                "duplicate embedding index {slot}"
            )));
        }
    }
    vectors
        .into_iter()
        .map(|v| v.ok_or_else(|| EmbedError::Parse("missing embedding index".into())))
        .collect()
}

/// Pull the `embedding` number array out of one `data` item.
fn parse_embedding_vector(item: &Value) -> Result<Vec<f32>, EmbedError> {
    let numbers = item
        .get("embedding")
        .and_then(Value::as_array)
        .ok_or_else(|| EmbedError::Parse("data item has no `embedding` array".into()))?;
    numbers
        .iter()
        .map(|n| {
            n.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EmbedError::Parse("embedding value is not a number".into()))
        })
        .collect()
}
