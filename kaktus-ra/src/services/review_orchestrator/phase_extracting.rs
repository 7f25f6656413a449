//! Phase 2: EXTRACTING
//!
//! Insight extraction is the only fan-out in a run. At most
//! `insight_concurrency` calls are in flight; each result carries its review
//! index and label, so completion order does not affect the merge.
//! The first failure drops every other in-flight call.

use futures::stream::{self, StreamExt, TryStreamExt};

use super::{AnalysisError, ReviewOrchestrator};
use crate::models::{AnalysisRun, AnalysisState, Insight, SentimentLabel};

impl ReviewOrchestrator {
    /// Phase 2: EXTRACTING - one insight per Positive/Negative review
    pub(super) async fn phase_extracting(
        &self,
        mut run: AnalysisRun,
        reviews: &[String],
    ) -> Result<AnalysisRun, AnalysisError> {
        run.transition_to(AnalysisState::Extracting);

        let targets: Vec<(usize, SentimentLabel)> = run
            .polar_review_indices()
            .into_iter()
            .map(|index| (index, run.labels()[index].clone()))
            .collect();
        let total = targets.len();

        tracing::info!(
            run_id = %run.run_id,
            reviews = total,
            skipped = run.review_count() - total,
            "Phase 2: EXTRACTING"
        );

        let run_id = run.run_id;
        let extractor = &self.extractor;

        let extracted: Vec<Option<Insight>> = stream::iter(targets)
            .map(|(index, label)| {
                let review = reviews[index].as_str();
                async move {
                    let insight = extractor.extract(index, review, &label).await?;
                    tracing::debug!(run_id = %run_id, review_index = index, "Insight extracted");
                    Ok::<_, crate::llm::LlmError>(insight)
                }
            })
            .buffer_unordered(self.settings.insight_concurrency)
            .try_collect()
            .await
            .map_err(|e| AnalysisError::step(AnalysisState::Extracting, e))?;

        let insights: Vec<Insight> = extracted.into_iter().flatten().collect();

        tracing::info!(
            run_id = %run.run_id,
            insights = insights.len(),
            empty = total - insights.len(),
            "Extraction completed"
        );

        run.merge_insights(insights);
        Ok(run)
    }
}
