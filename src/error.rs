use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Upstream request failed: {0}")]
    UpstreamError(String),

    #[error("Dataset error: {0}")]
    DatasetError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::ValidationError(msg) => {
                tracing::warn!(error = %msg, "Validation error");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!(error = %msg, "Rejected unauthorized request");
                (StatusCode::UNAUTHORIZED, msg.clone())
            }
            AppError::NotConfigured(msg) => {
                tracing::warn!(error = %msg, "Operation requires configuration");
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            AppError::UpstreamError(e) => {
                tracing::error!(error = %e, "Upstream error");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::DatasetError(e) => {
                tracing::error!(error = %e, "Dataset error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::UpstreamError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::UpstreamError(format!("Malformed payload: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
