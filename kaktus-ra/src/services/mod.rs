//! Service modules for review analysis
//!
//! - [`SentimentClassifier`]: batched sentiment labels with per-review fallback
//! - [`InsightExtractor`]: one actionable insight per Positive/Negative review
//! - [`Summarizer`]: delighters / detractors digests
//! - [`ReviewOrchestrator`]: runs the three steps in order
//! - [`review_reader`]: CSV upload boundary

pub mod insight_extractor;
pub mod rate_limiter;
pub mod review_orchestrator;
pub mod review_reader;
pub mod sentiment_classifier;
pub mod summarizer;

pub use insight_extractor::InsightExtractor;
pub use rate_limiter::RateLimiter;
pub use review_orchestrator::{AnalysisError, OrchestratorSettings, ReviewOrchestrator};
pub use review_reader::{read_reviews, ReviewReadError};
pub use sentiment_classifier::SentimentClassifier;
pub use summarizer::{SummaryRole, Summarizer};
