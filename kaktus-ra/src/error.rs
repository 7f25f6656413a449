//! Error types for kaktus-ra
//!
//! Every failure reaches the client as `{ "error": "<message>" }`.
//! Server-side details (provider errors, configuration) stay in the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{AnalysisError, ReviewReadError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Provider credentials or client missing (500)
    #[error("Server misconfigured: {0}")]
    Misconfigured(String),

    /// Provider or internal failure (500); detail is logged only
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Request abandoned during shutdown (503)
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// Message sent to the client
    fn client_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Misconfigured(_) => "server misconfigured".to_string(),
            ApiError::Internal(_) => "analysis failed".to_string(),
            ApiError::Unavailable(msg) => msg.clone(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Misconfigured(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidInput(msg) => ApiError::BadRequest(msg),
            AnalysisError::Cancelled => ApiError::Unavailable("analysis cancelled".to_string()),
            ref e if e.is_configuration() => ApiError::Misconfigured(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<crate::llm::LlmError> for ApiError {
    fn from(err: crate::llm::LlmError) -> Self {
        match err {
            crate::llm::LlmError::MissingCredentials => ApiError::Misconfigured(err.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ReviewReadError> for ApiError {
    fn from(err: ReviewReadError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = Json(json!({ "error": self.client_message() }));
        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
