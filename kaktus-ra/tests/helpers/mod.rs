//! Test Helper Utilities
//!
//! Shared utilities for testing kaktus-ra

#![allow(dead_code)]

pub mod scripted_client;

pub use scripted_client::{PromptKind, RecordedCall, ScriptedClient};

use kaktus_common::config::TomlConfig;
use kaktus_ra::llm::{CallPolicy, CompletionClient, LlmGateway};
use kaktus_ra::services::{OrchestratorSettings, RateLimiter, ReviewOrchestrator};
use std::sync::Arc;

/// Defaults with the provider quota switched off
pub fn fast_config() -> TomlConfig {
    let mut config = TomlConfig::default();
    config.analysis.min_interval_ms = 0;
    config.analysis.retry_backoff_ms = 0;
    config
}

/// Orchestrator wired to `client` exactly as the service wires it
pub fn create_test_orchestrator(client: Arc<dyn CompletionClient>, config: &TomlConfig) -> ReviewOrchestrator {
    let gateway = LlmGateway::new(
        client,
        Arc::new(RateLimiter::from_millis(config.analysis.min_interval_ms)),
        CallPolicy::from_config(config),
    );
    ReviewOrchestrator::new(gateway, OrchestratorSettings::from(&config.analysis))
}

pub fn reviews(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}
