//! Client for the hosted agent completions endpoint.
//!
//! The agent receives the raw query and the tool catalogue and answers with a
//! message plus optional `{tool, params}` directives. It never executes the
//! tools itself; that stays with the orchestrator.

use crate::config::AgentEndpoint;
use crate::error::{AppError, Result};
use crate::tools::Tool;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct CompletionsRequest<'a> {
    message: &'a str,
    tools: &'a [Tool],
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolDirective {
    pub tool: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionsResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolDirective>,
}

pub struct CompletionsClient {
    http: Client,
    url: String,
    app_id: String,
    api_key: String,
}

impl CompletionsClient {
    pub fn new(endpoint: &AgentEndpoint, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: endpoint.completions_url(),
            app_id: endpoint.app_id.clone(),
            api_key: endpoint.api_key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn complete(&self, message: &str, tools: &[Tool]) -> Result<CompletionsResponse> {
        let response = self
            .http
            .post(&self.url)
            .header("x-algolia-application-id", &self.app_id)
            .header("x-algolia-api-key", &self.api_key)
            .json(&CompletionsRequest {
                message,
                tools,
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamError(format!(
                "completions endpoint returned {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await?;
        let parsed: CompletionsResponse = serde_json::from_slice(&bytes)?;

        tracing::debug!(
            tool_calls = parsed.tool_calls.len(),
            "Completions response received"
        );

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_without_tool_calls() {
        let parsed: CompletionsResponse =
            serde_json::from_value(json!({ "message": "Hello" })).unwrap();
        assert_eq!(parsed.message, "Hello");
        assert!(parsed.tool_calls.is_empty());
    }

    #[test]
    fn test_response_with_directives() {
        let parsed: CompletionsResponse = serde_json::from_value(json!({
            "message": "Checking prices",
            "tool_calls": [
                { "tool": "getMarketPulse", "params": { "crop": "Almonds" } },
                { "tool": "getBenchmarks" }
            ]
        }))
        .unwrap();

        assert_eq!(parsed.tool_calls.len(), 2);
        assert_eq!(parsed.tool_calls[0].params["crop"], "Almonds");
        assert!(parsed.tool_calls[1].params.is_null());
    }

    #[test]
    fn test_tool_calls_must_be_an_array() {
        let result: std::result::Result<CompletionsResponse, _> =
            serde_json::from_value(json!({ "message": "x", "tool_calls": "getMarketPulse" }));
        assert!(result.is_err());
    }
}
