use crate::error::{AppError, Result};
use crate::orchestrator::OrchestrationResult;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::Instrument;

/// Upper bound on chat message length, in characters.
const MAX_MESSAGE_CHARS: usize = 2_000;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /chat - Answer a natural language question.
///
/// # Flow
/// 1. Validate input
/// 2. Return a fresh cached answer for the same text, if any
/// 3. Resolve tool calls (agent, or keyword simulation on failure)
/// 4. Run the lookups and compose the message
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<OrchestrationResult>> {
    if request.message.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Message cannot be empty".to_string(),
        ));
    }
    if request.message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::ValidationError(format!(
            "Message exceeds {} characters",
            MAX_MESSAGE_CHARS
        )));
    }

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);
    let start_time = std::time::Instant::now();

    let result = state
        .orchestrator
        .run(&request.message)
        .instrument(span)
        .await;

    let elapsed = start_time.elapsed();
    tracing::info!(
        %request_id,
        orchestration = ?result.metadata.orchestration_type,
        latency_ms = elapsed.as_millis() as u64,
        "Chat request completed"
    );

    metrics::counter!("chat_requests_total").increment(1);
    metrics::histogram!("chat_latency_ms").record(elapsed.as_millis() as f64);

    Ok(Json(result))
}
