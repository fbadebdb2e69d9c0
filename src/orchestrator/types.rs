use crate::records::{RecordBatch, ResultData};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationType {
    /// Tool calls chosen by the remote completions agent.
    AgentStudio,
    /// Tool calls chosen by the local keyword classifier.
    Simulated,
}

/// One executed tool call and what it returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub tool: String,
    pub params: Value,
    pub results: RecordBatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub agent_id: String,
    pub orchestration_type: OrchestrationType,
    /// Epoch milliseconds at composition time.
    pub timestamp: i64,
}

/// Everything returned for one chat query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestrationResult {
    pub message: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub data: ResultData,
    pub metadata: Metadata,
}
