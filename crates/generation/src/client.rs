//! Chat-completions HTTP client.

use crate::config::GenConfig;
use crate::error::GenerationError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
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

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Send one chat request and return the first choice's message content.
pub(crate) async fn chat_via_api(
    system_prompt: &str,
    user_prompt: &str,
    cfg: &GenConfig,
) -> Result<String, GenerationError> {
    let api_key = cfg
        .api_key
        .as_deref()
        .ok_or(GenerationError::MissingApiKey)?;

    let request = ChatRequest {
        model: &cfg.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: system_prompt,
            },
            ChatMessage {
                role: "user",
                content: user_prompt,
            },
        ],
        max_tokens: cfg.max_tokens,
        temperature: cfg.temperature,
    };

    tracing::debug!(model = %cfg.model, "requesting chat completion");

    let response = HTTP_CLIENT
        .post(&cfg.api_url)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {api_key}"))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(Duration::from_secs(cfg.timeout_secs))
            } else {
                GenerationError::Network(e.to_string())
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        tracing::warn!(status = status.as_u16(), %message, "chat completion failed");
        return Err(GenerationError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|e| GenerationError::Parse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::Parse("response has no message content".into()))
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to
/// the (truncated) raw body for anything else.
fn extract_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(body) {
        return parsed.error.message;
    }
    let trimmed = body.trim();
    if trimmed.len() <= MAX_ERROR_BODY {
        return trimmed.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_error_bodies_yield_the_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(extract_error_message(body), "Incorrect API key provided");
    }

    #[test]
    fn unstructured_error_bodies_pass_through_trimmed() {
        assert_eq!(extract_error_message("  upstream unavailable  "), "upstream unavailable");
    }

    #[test]
    fn oversized_error_bodies_are_truncated() {
        let body = "x".repeat(4 * MAX_ERROR_BODY);
        let message = extract_error_message(&body);
        assert!(message.len() < body.len());
        assert!(message.ends_with("..."));
    }

    #[test]
    fn request_serialization_skips_unset_tuning_fields() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: None,
            temperature: None,
        };
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(!json.contains("max_tokens"));
        assert!(!json.contains("temperature"));

        let tuned = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: Vec::new(),
            max_tokens: Some(64),
            temperature: Some(0.0),
        };
        let json = serde_json::to_string(&tuned).expect("serialize");
        assert!(json.contains("\"max_tokens\":64"));
        assert!(json.contains("\"temperature\":0.0"));
    }

    #[test]
    fn response_parsing_reads_the_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "FAISS is a similarity search library." } }
            ],
            "usage": { "total_tokens": 42 }
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).expect("parse");
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .expect("content");
        assert_eq!(content, "FAISS is a similarity search library.");
    }
}
