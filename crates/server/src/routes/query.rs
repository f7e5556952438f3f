use crate::error::{ErrorDetail, ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Query request
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Question to answer
    pub query: String,

    /// Number of documents to retrieve (defaults to the configured value)
    #[serde(default)]
    pub k: Option<usize>,
}

/// Query response
///
/// On success `answer` is present and `error` is absent. When generation
/// fails after a successful retrieval, `retrieved_docs` is still populated
/// and `error` carries the failure detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub retrieved_docs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// Answer a question over the indexed corpus.
///
/// Embeds the query, retrieves the top-k nearest documents, and asks the
/// generation provider for an answer grounded in them. Retrieval and
/// generation run under a shared semaphore permit so the number of in-flight
/// provider calls stays bounded.
pub async fn query(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<QueryRequest>,
) -> ServerResult<impl IntoResponse> {
    let start = Instant::now();
    counter!("ragline_queries_total").increment(1);

    let _permit = state
        .provider_permits
        .clone()
        .acquire_owned()
        .await
        .map_err(|_| ServerError::Internal("query semaphore closed".to_string()))?;

    let context = match state.retriever.retrieve(&request.query, request.k).await {
        Ok(context) => context,
        Err(err) => {
            counter!("ragline_query_errors_total", "stage" => "retrieval").increment(1);
            return Err(err.into());
        }
    };
    counter!("ragline_retrieval_hits").increment(context.documents.len() as u64);

    let retrieved_docs = context.texts();
    match generation::answer(&request.query, retrieved_docs.clone(), &state.generation).await {
        Ok(answer) => {
            histogram!("ragline_query_duration_seconds").record(start.elapsed().as_secs_f64());
            Ok((
                axum::http::StatusCode::OK,
                Json(QueryResponse {
                    query: answer.query,
                    retrieved_docs,
                    answer: Some(answer.answer),
                    error: None,
                }),
            ))
        }
        Err(err) => {
            counter!("ragline_query_errors_total", "stage" => "generation").increment(1);
            let err = ServerError::Generation(err);
            tracing::error!(error = %err, query = %request.query, "generation failed");
            Ok((
                err.status_code(),
                Json(QueryResponse {
                    query: request.query,
                    retrieved_docs,
                    answer: None,
                    error: Some(ErrorDetail {
                        code: err.error_code().to_string(),
                        message: err.to_string(),
                        details: None,
                    }),
                }),
            ))
        }
    }
}
