//! Deterministic prompt assembly.
//!
//! The same query and document list always produce the same prompt, so
//! generation output differences can only come from the model itself.

/// Fixed system instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. Base your answer on the provided \
     context when it is relevant; otherwise answer from your own knowledge.";

/// Build the user message: retrieved documents verbatim, in retrieval
/// order, followed by the original query.
///
/// With no documents the context block is omitted entirely rather than
/// left empty, so the model is not told to use context that is not there.
pub fn build_user_prompt(query: &str, documents: &[String]) -> String {
    if documents.is_empty() {
        return format!("Question: {query}\n\nAnswer:");
    }
    let context = documents.join("\n\n");
    format!(
        "Use the following context to answer the question.\n\nContext:\n{context}\n\nQuestion: {query}\n\nAnswer:"
    )
}
