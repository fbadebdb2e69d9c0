//! Direct index search for the browser UI.
//!
//! Bypasses intent routing: the caller names the category (or gets all four)
//! and optional attribute filters. Store failures fall back to the local
//! dataset the same way tool calls do.

use crate::error::{AppError, Result};
use crate::records::{Category, ResultData};
use crate::state::AppState;
use crate::store::{Filters, SearchQuery, DIRECT_HITS_PER_PAGE};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Free text matched against each index. May be empty to browse.
    #[serde(default)]
    pub query: String,
    /// Restrict to one category (default: all four)
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub hits_per_page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub data: ResultData,
    /// Most recent market `lastUpdated` among the hits, in epoch milliseconds.
    pub last_updated: Option<i64>,
}

/// POST /search - Search one category or all of them.
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let start_time = std::time::Instant::now();

    let hits_per_page = request.hits_per_page.unwrap_or(DIRECT_HITS_PER_PAGE);
    if hits_per_page == 0 || hits_per_page > DIRECT_HITS_PER_PAGE {
        return Err(AppError::ValidationError(format!(
            "hits_per_page must be between 1 and {}",
            DIRECT_HITS_PER_PAGE
        )));
    }

    let categories: Vec<Category> = match request.category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };

    let query = SearchQuery::new(request.query.trim(), request.filters, hits_per_page);
    let data = state.orchestrator.search_many(&categories, &query).await;
    let last_updated = data.market_last_updated();

    tracing::info!(
        query = %query.text,
        categories = categories.len(),
        total_ms = start_time.elapsed().as_millis() as u64,
        "Direct search completed"
    );

    metrics::counter!("search_requests_total").increment(1);

    Ok(Json(SearchResponse { data, last_updated }))
}
