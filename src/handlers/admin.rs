//! Admin endpoints. Everything except status requires `Authorization: Bearer <ADMIN_TOKEN>`.

use crate::admin::{AdminStatus, InitializeSummary, SyncSummary};
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub prices: Vec<Value>,
}

/// GET /admin/status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<AdminStatus> {
    Json(state.admin.status())
}

/// POST /admin/initialize - Configure index settings and seed the demo records
pub async fn initialize_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<InitializeSummary>> {
    authorize(&state, &headers)?;

    let summary = state.admin.initialize(state.fallback.dataset()).await?;
    Ok(Json(summary))
}

/// POST /admin/market-prices/sync - Validate and index submitted prices
pub async fn sync_market_prices_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncSummary>> {
    authorize(&state, &headers)?;

    if request.prices.is_empty() {
        return Err(AppError::ValidationError(
            "prices cannot be empty".to_string(),
        ));
    }

    let summary = state.admin.sync_market_prices(&request.prices).await?;
    Ok(Json(summary))
}

/// Admin calls are refused outright while no token is configured.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let expected = state
        .config
        .admin_token
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("admin access is disabled".to_string()))?;

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match provided {
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(AppError::Unauthorized("invalid admin token".to_string())),
        None => Err(AppError::Unauthorized(
            "missing bearer token".to_string(),
        )),
    }
}
