//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok", or "degraded" without a provider)
    pub status: String,
    /// Module name ("kaktus-ra")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Commit, UTC build time and profile stamped by build.rs
    pub build: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Whether provider credentials were resolved at startup
    pub provider_configured: bool,
    /// Last error message if any (for diagnostics)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let last_error = state.last_error.read().await.clone();
    let provider_configured = state.orchestrator.is_some();

    Json(HealthResponse {
        status: if provider_configured { "ok" } else { "degraded" }.to_string(),
        module: "kaktus-ra".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: env!("BUILD_ID").to_string(),
        uptime_seconds,
        provider_configured,
        last_error,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
