//! kaktus-ra library interface for testing
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use kaktus_common::config::TomlConfig;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::llm::{CallPolicy, CompletionClient, GroqClient, LlmGateway};
use crate::services::{OrchestratorSettings, RateLimiter, ReviewOrchestrator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// `None` when no provider credentials could be resolved
    pub orchestrator: Option<Arc<ReviewOrchestrator>>,
    /// Max CSV data rows read per upload
    pub csv_row_limit: usize,
    /// Cancelled on shutdown; aborts in-flight runs
    pub shutdown: CancellationToken,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    /// Build state around the configured HTTP provider
    ///
    /// Missing credentials do not stop startup; analysis requests then fail
    /// with a misconfiguration error.
    pub fn from_config(config: &TomlConfig) -> Self {
        let client = match crate::config::resolve_provider_api_key(config) {
            Ok(key) => match GroqClient::from_config(key, &config.provider) {
                Ok(client) => Some(Arc::new(client) as Arc<dyn CompletionClient>),
                Err(e) => {
                    tracing::error!(error = %e, "Provider client could not be created");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Provider API key missing; analysis disabled");
                None
            }
        };

        Self::build(client, config)
    }

    /// Build state around an injected provider
    pub fn with_client(client: Arc<dyn CompletionClient>, config: &TomlConfig) -> Self {
        Self::build(Some(client), config)
    }

    /// State with no provider at all
    pub fn unconfigured(config: &TomlConfig) -> Self {
        Self::build(None, config)
    }

    fn build(client: Option<Arc<dyn CompletionClient>>, config: &TomlConfig) -> Self {
        // One limiter per process: every run and every route shares the quota
        let rate_limiter = Arc::new(RateLimiter::from_millis(config.analysis.min_interval_ms));

        let orchestrator = client.map(|client| {
            let gateway = LlmGateway::new(client, rate_limiter, CallPolicy::from_config(config));
            Arc::new(ReviewOrchestrator::new(
                gateway,
                OrchestratorSettings::from(&config.analysis),
            ))
        });

        Self {
            orchestrator,
            csv_row_limit: config.analysis.csv_row_limit,
            shutdown: CancellationToken::new(),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Orchestrator, or a misconfiguration error
    pub fn orchestrator(&self) -> ApiResult<&ReviewOrchestrator> {
        self.orchestrator
            .as_deref()
            .ok_or_else(|| ApiError::Misconfigured("provider API key not configured".to_string()))
    }

    /// Remember a failure for `/health`
    pub async fn record_error(&self, error: &ApiError) {
        *self.last_error.write().await = Some(error.to_string());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analyze_routes())
        .merge(api::single_step_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
