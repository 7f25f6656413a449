//! Data models for kaktus-ra (Review Analyzer)
//!
//! - Sentiment labels and ordered per-label counts
//! - Analysis run state machine, insights and the final result

pub mod analysis_run;
pub mod sentiment;

pub use analysis_run::{AnalysisResult, AnalysisRun, AnalysisState, Insight};
pub use sentiment::{SentimentCounts, SentimentLabel};
