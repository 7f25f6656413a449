//! Phase 3: SUMMARIZING

use super::{AnalysisError, ReviewOrchestrator};
use crate::models::{AnalysisRun, AnalysisState};
use crate::services::SummaryRole;

impl ReviewOrchestrator {
    /// Phase 3: SUMMARIZING - delighters digest, then detractors digest
    ///
    /// # Returns
    /// `(delighters_summary, detractors_summary)`
    pub(super) async fn phase_summarizing(
        &self,
        run: &mut AnalysisRun,
    ) -> Result<(String, String), AnalysisError> {
        run.transition_to(AnalysisState::Summarizing);

        let positive: Vec<&str> = run.positive_insights().iter().map(|i| i.text.as_str()).collect();
        let negative: Vec<&str> = run.negative_insights().iter().map(|i| i.text.as_str()).collect();

        tracing::info!(
            run_id = %run.run_id,
            positive = positive.len(),
            negative = negative.len(),
            "Phase 3: SUMMARIZING"
        );

        let delighters = self
            .summarizer
            .summarize(SummaryRole::Delighters, &positive)
            .await
            .map_err(|e| AnalysisError::step(AnalysisState::Summarizing, e))?;

        let detractors = self
            .summarizer
            .summarize(SummaryRole::Detractors, &negative)
            .await
            .map_err(|e| AnalysisError::step(AnalysisState::Summarizing, e))?;

        Ok((delighters, detractors))
    }
}
