use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use kn_core::SearchResult;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Client-facing errors. Provider failures are reported generically;
/// details stay in the server log.
pub enum ApiError {
    Validation(String),
    Unavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "search backend is unavailable".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `POST /search`: embed the query and return the nearest articles,
/// ordered by descending similarity score. An empty index yields an empty
/// list, not an error.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::Validation("query must not be empty".to_string()));
    }
    let top_k = request.top_k.unwrap_or(state.default_top_k);

    let vector = state.embedder.embed(query).await.map_err(|e| {
        tracing::error!("query embedding failed: {}", e);
        ApiError::Unavailable
    })?;

    let matches = state.index.query(&vector, top_k).await.map_err(|e| {
        tracing::error!("index query failed: {}", e);
        ApiError::Unavailable
    })?;

    let results = matches
        .into_iter()
        .map(|m| SearchResult {
            title: m.metadata.title,
            date: m.metadata.date,
            url: m.metadata.url,
            score: m.score,
        })
        .collect();

    Ok(Json(results))
}
