//! Analysis run state machine and result
//!
//! A run progresses STARTED → CLASSIFYING → EXTRACTING → SUMMARIZING → COMPLETED.
//! All accumulators live in [`AnalysisRun`], which is owned by one request and
//! consumed into an immutable [`AnalysisResult`] at the end.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::sentiment::{SentimentCounts, SentimentLabel};

/// Analysis workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnalysisState {
    /// Input accepted, nothing sent yet
    Started,
    /// Batched sentiment classification
    Classifying,
    /// Per-review insight extraction (Positive/Negative only)
    Extracting,
    /// Delighters and detractors digests
    Summarizing,
    /// Result assembled
    Completed,
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisState::Started => "STARTED",
            AnalysisState::Classifying => "CLASSIFYING",
            AnalysisState::Extracting => "EXTRACTING",
            AnalysisState::Summarizing => "SUMMARIZING",
            AnalysisState::Completed => "COMPLETED",
        };
        f.write_str(name)
    }
}

/// Short actionable insight derived from one Positive or Negative review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    /// Position of the source review in the uploaded list
    pub review_index: usize,
    /// Label of the source review
    pub label: SentimentLabel,
    pub text: String,
}

impl Insight {
    /// Returns `None` when the text is empty after trimming
    pub fn new(review_index: usize, label: SentimentLabel, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            review_index,
            label,
            text: text.to_string(),
        })
    }

    /// Length metric reported in `insightLengths`
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Final response of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub sentiment_counts: SentimentCounts,
    /// Word count of every insight, in review order
    pub insight_lengths: Vec<usize>,
    pub delighters_summary: String,
    pub detractors_summary: String,
}

/// Run-scoped accumulators
#[derive(Debug)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub state: AnalysisState,
    review_count: usize,
    labels: Vec<SentimentLabel>,
    counts: SentimentCounts,
    positive_insights: Vec<Insight>,
    negative_insights: Vec<Insight>,
}

impl AnalysisRun {
    pub fn new(review_count: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: AnalysisState::Started,
            review_count,
            labels: Vec::with_capacity(review_count),
            counts: SentimentCounts::new(),
            positive_insights: Vec::new(),
            negative_insights: Vec::new(),
        }
    }

    pub fn transition_to(&mut self, new_state: AnalysisState) {
        tracing::debug!(
            run_id = %self.run_id,
            old_state = %self.state,
            new_state = %new_state,
            "Analysis state transition"
        );
        self.state = new_state;
    }

    pub fn review_count(&self) -> usize {
        self.review_count
    }

    /// Append the labels of the next batch, in review order
    pub fn apply_labels(&mut self, labels: Vec<SentimentLabel>) {
        for label in labels {
            self.counts.record(&label);
            self.labels.push(label);
        }
    }

    /// Labels applied so far, aligned with review positions
    pub fn labels(&self) -> &[SentimentLabel] {
        &self.labels
    }

    /// True once every review has a label
    pub fn is_fully_classified(&self) -> bool {
        self.labels.len() == self.review_count
    }

    pub fn counts(&self) -> &SentimentCounts {
        &self.counts
    }

    /// Indices of reviews that need an insight
    pub fn polar_review_indices(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.is_polar())
            .map(|(index, _)| index)
            .collect()
    }

    /// Merge extraction results; completion order does not matter
    pub fn merge_insights(&mut self, mut insights: Vec<Insight>) {
        insights.sort_by_key(|insight| insight.review_index);
        for insight in insights {
            match insight.label {
                SentimentLabel::Positive => self.positive_insights.push(insight),
                SentimentLabel::Negative => self.negative_insights.push(insight),
                ref other => {
                    tracing::warn!(
                        run_id = %self.run_id,
                        review_index = insight.review_index,
                        label = %other,
                        "Discarding insight for non-polar review"
                    );
                }
            }
        }
    }

    pub fn positive_insights(&self) -> &[Insight] {
        &self.positive_insights
    }

    pub fn negative_insights(&self) -> &[Insight] {
        &self.negative_insights
    }

    /// Word counts of all insights in review order
    pub fn insight_lengths(&self) -> Vec<usize> {
        let mut all: Vec<&Insight> = self
            .positive_insights
            .iter()
            .chain(self.negative_insights.iter())
            .collect();
        all.sort_by_key(|insight| insight.review_index);
        all.into_iter().map(Insight::word_count).collect()
    }

    /// Consume the run into its final result
    pub fn complete(mut self, delighters_summary: String, detractors_summary: String) -> AnalysisResult {
        self.transition_to(AnalysisState::Completed);
        AnalysisResult {
            insight_lengths: self.insight_lengths(),
            sentiment_counts: self.counts,
            delighters_summary,
            detractors_summary,
        }
    }
}
