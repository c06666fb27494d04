use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use webindex_core::query::normalize_query;
use webindex_core::{SearchResult, SharedIndex};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    /// Exact match instead of prefix match.
    #[serde(default)]
    pub exact: bool,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub queries: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<SharedIndex>,
}

/// Routes search over a live in-memory index. The index is the only
/// shared state; nothing is tracked per request or per session.
pub fn build_app(index: Arc<SharedIndex>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/stats", get(stats_handler))
        .with_state(AppState { index })
        .layer(cors)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let start = Instant::now();
    let words = normalize_query(&params.q);
    let results = if words.is_empty() {
        Vec::new()
    } else if params.exact {
        state.index.exact_search(&words)
    } else {
        state.index.partial_search(&words)
    };
    Json(SearchResponse {
        queries: words.join(" "),
        took_s: start.elapsed().as_secs_f64(),
        total_hits: results.len(),
        results,
    })
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "words": state.index.word_count(),
        "empty": state.index.is_empty(),
    }))
}
