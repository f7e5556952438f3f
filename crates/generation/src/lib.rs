//! Answer generation for the ragline pipeline.
//!
//! Takes a query plus the documents retrieval produced, assembles a
//! deterministic prompt, and asks a chat-completion model for the answer.
//! Two providers share the same call shape:
//!
//! - `openai`: any OpenAI-compatible `/v1/chat/completions` endpoint.
//! - `echo`: returns the assembled user prompt verbatim, prefixed with
//!   `[echo] `. No network, no key. Useful for tests and local smoke runs.
//!
//! An empty document list is not an error: the prompt simply carries no
//! context block and the model answers from its own knowledge.

pub mod config;
pub mod error;
pub mod prompt;

mod client;

use serde::{Deserialize, Serialize};

pub use config::GenConfig;
pub use error::GenerationError;

/// Final response of the pipeline: the query, the context documents that
/// were fed to the model (in retrieval order), and the model's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationAnswer {
    pub query: String,
    pub documents: Vec<String>,
    pub answer: String,
}

/// Run one generation call against the configured provider.
pub async fn generate(
    system_prompt: &str,
    user_prompt: &str,
    cfg: &GenConfig,
) -> Result<String, GenerationError> {
    cfg.validate()?;
    match cfg.provider.as_str() {
        "echo" => Ok(format!("[echo] {user_prompt}")),
        "openai" => client::chat_via_api(system_prompt, user_prompt, cfg).await,
        other => Err(GenerationError::InvalidConfig(format!(
            "unknown provider `{other}`"
        ))),
    }
}

/// Answer a query using retrieved documents as context.
///
/// Documents are embedded in the prompt verbatim and in the order given;
/// the model's textual output is returned untouched as `answer`.
pub async fn answer(
    query: &str,
    documents: Vec<String>,
    cfg: &GenConfig,
) -> Result<GenerationAnswer, GenerationError> {
    let user_prompt = prompt::build_user_prompt(query, &documents);
    let text = generate(prompt::SYSTEM_PROMPT, &user_prompt, cfg).await?;
    Ok(GenerationAnswer {
        query: query.to_string(),
        documents,
        answer: text,
    })
}
