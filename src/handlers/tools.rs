use crate::state::AppState;
use crate::tools::Tool;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<Tool>,
}

/// GET /tools - Tool catalogue, as sent to the completions agent
pub async fn tools_handler(State(state): State<Arc<AppState>>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.orchestrator.registry().tools().to_vec(),
    })
}
