//! Delighters / detractors digests

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::llm::{LlmError, LlmGateway};

/// Which digest to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryRole {
    /// Summary of positive insights
    Delighters,
    /// Summary of negative insights
    Detractors,
}

impl SummaryRole {
    /// Returned without a provider call when there is nothing to summarize
    pub fn empty_sentinel(self) -> &'static str {
        match self {
            SummaryRole::Delighters => "No positive insights to summarize.",
            SummaryRole::Detractors => "No negative insights to summarize.",
        }
    }
}

impl fmt::Display for SummaryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryRole::Delighters => f.write_str("Delighters"),
            SummaryRole::Detractors => f.write_str("Detractors"),
        }
    }
}

/// Digest prompt with every insight as a `- ` bullet line
pub fn build_summary_prompt<S: AsRef<str>>(role: SummaryRole, insights: &[S]) -> String {
    let bullets: Vec<String> = insights
        .iter()
        .map(|insight| format!("- {}", insight.as_ref()))
        .collect();
    let bullets = bullets.join("\n");

    match role {
        SummaryRole::Delighters => format!(
            "You are summarizing what customers love about a clothing brand.\n\
             Format as up to 5 bullet points titled \"Delighters\".\n\n\
             Insights:\n{bullets}"
        ),
        SummaryRole::Detractors => format!(
            "You are summarizing what needs improvement for a clothing brand.\n\
             Format as up to 5 bullet points titled \"Detractors\" with actionable recommendations.\n\n\
             Insights:\n{bullets}"
        ),
    }
}

/// Summarizer service
#[derive(Clone)]
pub struct Summarizer {
    gateway: LlmGateway,
}

impl Summarizer {
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    pub async fn summarize<S: AsRef<str>>(&self, role: SummaryRole, insights: &[S]) -> Result<String, LlmError> {
        if insights.is_empty() {
            return Ok(role.empty_sentinel().to_string());
        }

        let raw = self.gateway.complete(&build_summary_prompt(role, insights)).await?;
        tracing::debug!(role = %role, insights = insights.len(), "Summary received");
        Ok(raw.trim().to_string())
    }
}
