//! Thin HTTP client for the hosted search REST API.

use crate::config::SearchCredentials;
use crate::error::{AppError, Result};
use crate::store::{filter_expression, SearchQuery};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const APP_ID_HEADER: &str = "x-algolia-application-id";
const API_KEY_HEADER: &str = "x-algolia-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<String>,
    hits_per_page: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    hits: Vec<Value>,
}

pub struct SearchClient {
    http: Client,
    base_url: String,
    app_id: String,
    api_key: String,
}

impl SearchClient {
    pub fn new(credentials: &SearchCredentials, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            app_id: credentials.app_id.clone(),
            api_key: credentials.api_key.clone(),
        })
    }

    fn index_url(&self, index: &str, action: &str) -> String {
        format!("{}/1/indexes/{}/{}", self.base_url, index, action)
    }

    /// Filtered search on one index. Returns the raw hit objects.
    pub async fn query(&self, index: &str, query: &SearchQuery) -> Result<Vec<Value>> {
        let body = QueryBody {
            query: &query.text,
            filters: filter_expression(&query.filters),
            hits_per_page: query.hits_per_page,
        };

        let response = self
            .http
            .post(self.index_url(index, "query"))
            .header(APP_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let response = check_status(response, index).await?;
        let parsed: QueryResponse = response.json().await?;

        tracing::debug!(
            index,
            query = %query.text,
            filters = ?body.filters,
            hits = parsed.hits.len(),
            "Index search completed"
        );

        Ok(parsed.hits)
    }

    /// Add or replace objects by `objectID`.
    pub async fn save_objects(&self, index: &str, objects: &[Value]) -> Result<()> {
        let requests: Vec<Value> = objects
            .iter()
            .map(|body| json!({ "action": "updateObject", "body": body }))
            .collect();

        let response = self
            .http
            .post(self.index_url(index, "batch"))
            .header(APP_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        check_status(response, index).await?;

        tracing::info!(index, count = objects.len(), "Objects indexed");
        Ok(())
    }

    pub async fn set_settings(&self, index: &str, settings: &Value) -> Result<()> {
        let response = self
            .http
            .put(self.index_url(index, "settings"))
            .header(APP_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.api_key)
            .json(settings)
            .send()
            .await?;
        check_status(response, index).await?;

        tracing::info!(index, "Index settings applied");
        Ok(())
    }
}

async fn check_status(response: reqwest::Response, index: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::UpstreamError(format!(
        "index {} returned {}: {}",
        index, status, body
    )))
}
