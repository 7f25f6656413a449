//! Phase 1: CLASSIFYING
//!
//! Reviews are chunked into batches and classified strictly one batch after
//! another, so labels are appended in original review order.

use super::{AnalysisError, ReviewOrchestrator};
use crate::models::{AnalysisRun, AnalysisState};
use crate::services::rate_limiter::chunk;

impl ReviewOrchestrator {
    /// Phase 1: CLASSIFYING - label every review
    ///
    /// # Returns
    /// Run with one label per review and updated counts
    pub(super) async fn phase_classifying(
        &self,
        mut run: AnalysisRun,
        reviews: &[String],
    ) -> Result<AnalysisRun, AnalysisError> {
        run.transition_to(AnalysisState::Classifying);

        let batches = chunk(reviews, self.settings.batch_size);
        let total_batches = batches.len();

        tracing::info!(
            run_id = %run.run_id,
            batches = total_batches,
            "Phase 1: CLASSIFYING"
        );

        for (batch_index, batch) in batches.into_iter().enumerate() {
            let labels = self
                .classifier
                .classify_batch(batch)
                .await
                .map_err(|e| AnalysisError::step(AnalysisState::Classifying, e))?;

            debug_assert_eq!(labels.len(), batch.len());
            run.apply_labels(labels);

            tracing::debug!(
                run_id = %run.run_id,
                progress = %format!("{}/{}", batch_index + 1, total_batches),
                "Batch classified"
            );
        }

        debug_assert!(run.is_fully_classified());

        tracing::info!(
            run_id = %run.run_id,
            labels = run.counts().iter().count(),
            classified = run.counts().total(),
            "Classification completed"
        );

        Ok(run)
    }
}
