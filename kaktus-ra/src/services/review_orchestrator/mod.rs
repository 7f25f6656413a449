//! Review analysis orchestrator
//!
//! Coordinates one analysis run through all states.
//!
//! # State Progression
//! STARTED → CLASSIFYING → EXTRACTING → SUMMARIZING → COMPLETED
//!
//! Each state is handled by a dedicated `phase_*` method:
//!
//! - **CLASSIFYING**: batches classified one after another, labels applied in review order
//! - **EXTRACTING**: insights for Positive/Negative reviews, bounded fan-out
//! - **SUMMARIZING**: delighters then detractors
//!
//! A phase starts only after the previous one produced its complete output.
//! Any failure aborts the run and the partial [`AnalysisRun`] is dropped.

use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::llm::{LlmError, LlmGateway};
use crate::models::{AnalysisResult, AnalysisRun, AnalysisState};
use crate::services::{InsightExtractor, SentimentClassifier, Summarizer};
use kaktus_common::config::AnalysisConfig;

mod phase_classifying;
mod phase_extracting;
mod phase_summarizing;

/// Run-level failure
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{step} failed: {source}")]
    Step {
        step: AnalysisState,
        #[source]
        source: LlmError,
    },

    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    fn step(step: AnalysisState, source: LlmError) -> Self {
        AnalysisError::Step { step, source }
    }

    /// True when the provider was never reachable because of configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AnalysisError::Step {
                source: LlmError::MissingCredentials,
                ..
            }
        )
    }
}

/// Batching and fan-out limits for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub batch_size: usize,
    pub insight_concurrency: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

impl From<&AnalysisConfig> for OrchestratorSettings {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            insight_concurrency: config.insight_concurrency.max(1),
        }
    }
}

/// Review analysis orchestrator service
#[derive(Clone)]
pub struct ReviewOrchestrator {
    classifier: SentimentClassifier,
    extractor: InsightExtractor,
    summarizer: Summarizer,
    settings: OrchestratorSettings,
}

impl ReviewOrchestrator {
    /// All three services share the gateway, and with it the rate limiter
    pub fn new(gateway: LlmGateway, settings: OrchestratorSettings) -> Self {
        Self {
            classifier: SentimentClassifier::new(gateway.clone()),
            extractor: InsightExtractor::new(gateway.clone()),
            summarizer: Summarizer::new(gateway),
            settings,
        }
    }

    pub fn classifier(&self) -> &SentimentClassifier {
        &self.classifier
    }

    pub fn extractor(&self) -> &InsightExtractor {
        &self.extractor
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    /// Execute a complete analysis run
    ///
    /// Cancelling `cancel_token` abandons in-flight provider calls.
    pub async fn analyze(
        &self,
        reviews: &[String],
        cancel_token: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        if reviews.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "reviews must be a non-empty list".to_string(),
            ));
        }

        let run = AnalysisRun::new(reviews.len());
        let run_id = run.run_id;
        let start_time = Instant::now();

        tracing::info!(
            run_id = %run_id,
            reviews = reviews.len(),
            batch_size = self.settings.batch_size,
            insight_concurrency = self.settings.insight_concurrency,
            "Starting review analysis"
        );

        let outcome = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => Err(AnalysisError::Cancelled),
            result = self.execute(run, reviews) => result,
        };

        match &outcome {
            Ok(result) => tracing::info!(
                run_id = %run_id,
                classified = result.sentiment_counts.total(),
                insights = result.insight_lengths.len(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Review analysis completed"
            ),
            Err(e) => tracing::error!(
                run_id = %run_id,
                error = %e,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Review analysis failed"
            ),
        }

        outcome
    }

    async fn execute(&self, mut run: AnalysisRun, reviews: &[String]) -> Result<AnalysisResult, AnalysisError> {
        // Phase 1: CLASSIFYING - one label per review
        run = self.phase_classifying(run, reviews).await?;

        // Phase 2: EXTRACTING - insights for Positive/Negative reviews
        run = self.phase_extracting(run, reviews).await?;

        // Phase 3: SUMMARIZING - delighters and detractors
        let (delighters, detractors) = self.phase_summarizing(&mut run).await?;

        Ok(run.complete(delighters, detractors))
    }
}
