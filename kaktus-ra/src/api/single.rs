//! Single-call endpoints
//!
//! Each route runs exactly one pipeline step for one input and answers with
//! plain text. They share the process-wide rate limiter with full runs.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::SentimentLabel;
use crate::services::SummaryRole;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub review: String,
}

#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    pub review: String,
    pub sentiment: String,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub role: SummaryRole,
    pub insights: Vec<String>,
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// POST /sentiment
///
/// Returns `Positive`, `Negative` or `Neutral` (or the provider's raw word).
pub async fn sentiment(
    State(state): State<AppState>,
    payload: Result<Json<SentimentRequest>, JsonRejection>,
) -> ApiResult<String> {
    let Json(request) = payload.map_err(bad_json)?;
    if request.review.trim().is_empty() {
        return Err(ApiError::BadRequest("review must not be empty".to_string()));
    }

    let label = state
        .orchestrator()?
        .classifier()
        .classify_one(&request.review)
        .await?;

    Ok(label.to_string())
}

/// POST /insight
///
/// Non-polar sentiments get an empty body without a provider call.
pub async fn insight(
    State(state): State<AppState>,
    payload: Result<Json<InsightRequest>, JsonRejection>,
) -> ApiResult<String> {
    let Json(request) = payload.map_err(bad_json)?;
    let label = SentimentLabel::parse(&request.sentiment);

    if !label.is_polar() {
        tracing::debug!(sentiment = %label, "No insight for non-polar sentiment");
        return Ok(String::new());
    }

    let insight = state
        .orchestrator()?
        .extractor()
        .extract(0, &request.review, &label)
        .await?;

    Ok(insight.map(|i| i.text).unwrap_or_default())
}

/// POST /summarize
pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> ApiResult<String> {
    let Json(request) = payload.map_err(bad_json)?;

    if request.insights.is_empty() {
        return Ok(request.role.empty_sentinel().to_string());
    }

    let summary = state
        .orchestrator()?
        .summarizer()
        .summarize(request.role, &request.insights)
        .await?;

    Ok(summary)
}

/// Build single-call routes
pub fn single_step_routes() -> Router<AppState> {
    Router::new()
        .route("/sentiment", post(sentiment))
        .route("/insight", post(insight))
        .route("/summarize", post(summarize))
}
