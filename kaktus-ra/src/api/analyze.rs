//! Full analysis endpoints
//!
//! `/analyze` takes a JSON list of reviews; `/upload` takes a raw CSV body.
//! Both run the same pipeline and return the same [`AnalysisResult`].

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::AnalysisResult;
use crate::services::read_reviews;
use crate::AppState;

/// POST /analyze request
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub reviews: Vec<String>,
}

/// POST /analyze
///
/// Classify, extract insights and summarize a list of reviews.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::BadRequest(format!(
            "body must be {{ \"reviews\": string[] }}: {}",
            rejection.body_text()
        ))
    })?;

    run_analysis(&state, request.reviews).await.map(Json)
}

/// POST /upload
///
/// Same as `/analyze`, reading reviews from the `Review` column of a CSV body.
pub async fn upload(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<AnalysisResult>> {
    let reviews = read_reviews(body.as_ref(), state.csv_row_limit)?;

    tracing::info!(
        bytes = body.len(),
        reviews = reviews.len(),
        row_limit = state.csv_row_limit,
        "CSV upload received"
    );

    run_analysis(&state, reviews).await.map(Json)
}

async fn run_analysis(state: &AppState, reviews: Vec<String>) -> ApiResult<AnalysisResult> {
    if reviews.is_empty() {
        return Err(ApiError::BadRequest(
            "reviews must be a non-empty list".to_string(),
        ));
    }

    let orchestrator = state.orchestrator()?;
    // Child token: shutdown cancels the run, the run never cancels shutdown
    let cancel_token = state.shutdown.child_token();

    match orchestrator.analyze(&reviews, &cancel_token).await {
        Ok(result) => Ok(result),
        Err(e) => {
            let err = ApiError::from(e);
            state.record_error(&err).await;
            Err(err)
        }
    }
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/upload", post(upload))
}
