pub mod admin;
pub mod chat;
pub mod health;
pub mod search;
pub mod tools;

pub use admin::{initialize_handler, status_handler, sync_market_prices_handler};
pub use chat::chat_handler;
pub use health::{health_handler, ready_handler};
pub use search::search_handler;
pub use tools::tools_handler;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// All application routes. `/metrics` and middleware are added by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Core endpoints
        .route("/chat", post(chat_handler))
        .route("/search", post(search_handler))
        .route("/tools", get(tools_handler))
        // Admin endpoints
        .route("/admin/status", get(status_handler))
        .route("/admin/initialize", post(initialize_handler))
        .route(
            "/admin/market-prices/sync",
            post(sync_market_prices_handler),
        )
        // Health endpoints
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}
