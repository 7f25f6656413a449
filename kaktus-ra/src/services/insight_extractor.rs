//! Per-review insight extraction
//!
//! Only Positive and Negative reviews reach this service; the orchestrator
//! filters Neutral and unexpected labels out before fan-out.

use crate::llm::{LlmError, LlmGateway};
use crate::models::{Insight, SentimentLabel};

/// Label-specific insight prompt
pub fn build_insight_prompt(review: &str, label: &SentimentLabel) -> String {
    if *label == SentimentLabel::Positive {
        format!(
            "You are an AI assistant extracting a single, concise, actionable insight from a POSITIVE review of a clothing brand.\n\
             Describe in 1–2 sentences exactly what the brand did well.\n\n\
             Review: {review}"
        )
    } else {
        format!(
            "You are an AI assistant extracting a single, concise, actionable insight from a NEGATIVE review of a clothing brand.\n\
             Describe in 1–2 sentences what went wrong and suggest one concrete improvement.\n\n\
             Review: {review}"
        )
    }
}

/// Insight extractor service
#[derive(Clone)]
pub struct InsightExtractor {
    gateway: LlmGateway,
}

impl InsightExtractor {
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    /// Extract the insight for review `review_index`
    ///
    /// Returns `Ok(None)` when the provider answers with blank text.
    pub async fn extract(
        &self,
        review_index: usize,
        review: &str,
        label: &SentimentLabel,
    ) -> Result<Option<Insight>, LlmError> {
        debug_assert!(label.is_polar(), "insight requested for {} review", label);

        let raw = self.gateway.complete(&build_insight_prompt(review, label)).await?;
        let insight = Insight::new(review_index, label.clone(), &raw);

        if insight.is_none() {
            tracing::debug!(review_index, "Provider returned an empty insight");
        }
        Ok(insight)
    }
}
