//! Shared helpers for the integration tests.
//!
//! `FakeUpstream` stands in for both the hosted search API and the
//! completions endpoint: one axum server on an ephemeral port that records
//! every request and answers from a fixed script.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Method, Request, StatusCode, Uri},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Make a JSON request to the router, optionally with a bearer token.
pub async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

/// What the fake upstream answers.
#[derive(Debug, Clone)]
pub struct Script {
    pub completions_status: u16,
    /// Raw body so tests can return malformed JSON.
    pub completions_body: String,
    pub search_status: u16,
    /// Hits returned per index name.
    pub hits: HashMap<String, Vec<Value>>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            completions_status: 200,
            completions_body: json!({ "message": "", "tool_calls": [] }).to_string(),
            search_status: 200,
            hits: HashMap::new(),
        }
    }
}

impl Script {
    pub fn completions(mut self, status: u16, body: impl Into<String>) -> Self {
        self.completions_status = status;
        self.completions_body = body.into();
        self
    }

    pub fn search_status(mut self, status: u16) -> Self {
        self.search_status = status;
        self
    }

    pub fn hits(mut self, index: &str, hits: Vec<Value>) -> Self {
        self.hits.insert(index.to_string(), hits);
        self
    }
}

#[derive(Clone)]
struct Shared {
    script: Arc<Script>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct FakeUpstream {
    pub url: String,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeUpstream {
    pub async fn start(script: Script) -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = Shared {
            script: Arc::new(script),
            log: Arc::clone(&log),
        };

        let app = Router::new().fallback(respond).with_state(shared);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            log,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn requests_to(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }
}

async fn respond(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: axum::http::HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    shared.log.lock().unwrap().push(RecordedRequest {
        method,
        path: path.clone(),
        api_key: headers
            .get("x-algolia-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let script = &shared.script;

    if path.ends_with("/completions") {
        return (
            StatusCode::from_u16(script.completions_status).unwrap(),
            script.completions_body.clone(),
        );
    }

    if script.search_status != 200 {
        return (
            StatusCode::from_u16(script.search_status).unwrap(),
            json!({ "message": "Invalid Application-ID or API key" }).to_string(),
        );
    }

    if path.ends_with("/query") {
        // /1/indexes/{index}/query
        let index = path.split('/').nth(3).unwrap_or_default();
        let hits = script.hits.get(index).cloned().unwrap_or_default();
        return (StatusCode::OK, json!({ "hits": hits }).to_string());
    }

    (StatusCode::OK, json!({ "taskID": 1 }).to_string())
}
