//! Batched sentiment classification
//!
//! One provider call classifies a whole batch. The reply is decoded into
//! exactly one label per review. If the label count does not match the batch
//! size, or any line is not a label, the batch is re-classified one review at
//! a time so that labels can never shift onto the wrong review.

use thiserror::Error;

use crate::llm::{LlmError, LlmGateway};
use crate::models::SentimentLabel;

const CLASSIFICATION_RULES: &str = "\
You are a sentiment classifier for a clothing brand.

• If the customer says anything negative, critical, or suggests an improvement, return Negative.
• If the everything in the customer review is positive only then retun Positive
• Otherwise, return Neutral.";

/// Reply could not be aligned with the batch
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected {expected} labels, found {found}")]
    CountMismatch { expected: usize, found: usize },

    #[error("line {position} is not a label: {token:?}")]
    UnrecognizedToken { position: usize, token: String },
}

/// Prompt for a single review
pub fn build_single_prompt(review: &str) -> String {
    format!(
        "{CLASSIFICATION_RULES}\n\n\
         Respond with exactly one word: Positive, Negative, or Neutral. No extra words.\n\n\
         Review: {review}"
    )
}

/// Prompt for a batch, reviews numbered in input order
pub fn build_batch_prompt<S: AsRef<str>>(reviews: &[S]) -> String {
    let count = reviews.len();
    let numbered: Vec<String> = reviews
        .iter()
        .enumerate()
        .map(|(i, review)| format!("{}. {}", i + 1, flatten(review.as_ref())))
        .collect();

    format!(
        "{CLASSIFICATION_RULES}\n\n\
         Classify each of the {count} reviews below.\n\
         Reply with exactly {count} lines, one label per review, in the same order as the reviews.\n\
         Each line must contain exactly one word: Positive, Negative, or Neutral. No numbering, no extra words.\n\n\
         Reviews:\n{}",
        numbered.join("\n")
    )
}

/// Keep one review per prompt line
fn flatten(review: &str) -> String {
    review.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip list markers and punctuation around a label token
///
/// Handles `3. Positive`, `3) Positive`, `Review 3: Positive`, `**Positive**`.
fn clean_token(token: &str) -> &str {
    let token = token.rsplit(':').next().unwrap_or(token);
    let token = token.trim_start_matches(|c: char| {
        c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | ')' | '-' | '*' | '#')
    });
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

/// The label a token starts with, if it is one of the three requested labels
///
/// `Positive - praises the service` is Positive; `The sentiment is negative`
/// is not a label.
fn leading_label(token: &str) -> Option<SentimentLabel> {
    let first_word = token.split(|c: char| !c.is_alphanumeric()).find(|w| !w.is_empty())?;
    match SentimentLabel::parse(first_word) {
        label @ (SentimentLabel::Positive | SentimentLabel::Negative | SentimentLabel::Neutral) => Some(label),
        _ => None,
    }
}

/// Decode a batch reply: comma, pipe or newline separated labels
///
/// Every token must lead with Positive, Negative or Neutral. Anything else
/// (a preamble, an unexpected label) rejects the whole reply, since a stray
/// line with a missing label would otherwise keep the count right and shift
/// every later label. Unexpected labels survive through the single-review path.
pub fn decode_batch_labels(raw: &str, expected: usize) -> Result<Vec<SentimentLabel>, DecodeError> {
    let tokens: Vec<&str> = raw
        .split(|c: char| matches!(c, ',' | '|' | '\n' | '\r'))
        .map(clean_token)
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.len() != expected {
        return Err(DecodeError::CountMismatch {
            expected,
            found: tokens.len(),
        });
    }

    tokens
        .into_iter()
        .enumerate()
        .map(|(position, token)| {
            leading_label(token).ok_or_else(|| DecodeError::UnrecognizedToken {
                position: position + 1,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Decode a single-review reply
///
/// A chatty reply that still names one of the three labels is accepted; short
/// unexpected answers are kept verbatim; anything else is `Unknown`.
pub fn decode_single_label(raw: &str) -> SentimentLabel {
    let Some(first_line) = raw.lines().map(str::trim).find(|line| !line.is_empty()) else {
        return SentimentLabel::Unknown;
    };

    let cleaned = clean_token(first_line);
    let label = SentimentLabel::parse(cleaned);
    if !matches!(label, SentimentLabel::Other(_)) {
        return label;
    }

    let named = first_line
        .split(|c: char| !c.is_alphanumeric())
        .find_map(leading_label);

    match named {
        Some(label) => label,
        None if cleaned.split_whitespace().count() <= 2 => label,
        None => SentimentLabel::Unknown,
    }
}

/// Sentiment classifier service
#[derive(Clone)]
pub struct SentimentClassifier {
    gateway: LlmGateway,
}

impl SentimentClassifier {
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    /// Classify one batch; the result is aligned by position with `reviews`
    pub async fn classify_batch<S: AsRef<str>>(&self, reviews: &[S]) -> Result<Vec<SentimentLabel>, LlmError> {
        debug_assert!(!reviews.is_empty(), "classification batch must not be empty");

        let raw = self.gateway.complete(&build_batch_prompt(reviews)).await?;

        match decode_batch_labels(&raw, reviews.len()) {
            Ok(labels) => Ok(labels),
            Err(e) => {
                tracing::warn!(
                    batch_size = reviews.len(),
                    error = %e,
                    "Batch reply not decodable, classifying reviews individually"
                );
                let mut labels = Vec::with_capacity(reviews.len());
                for review in reviews {
                    labels.push(self.classify_one(review.as_ref()).await?);
                }
                Ok(labels)
            }
        }
    }

    pub async fn classify_one(&self, review: &str) -> Result<SentimentLabel, LlmError> {
        let raw = self.gateway.complete(&build_single_prompt(review)).await?;
        let label = decode_single_label(&raw);
        if matches!(label, SentimentLabel::Unknown | SentimentLabel::Other(_)) {
            tracing::debug!(raw = %raw.trim(), label = %label, "Unexpected single-review label");
        }
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CallPolicy, CompletionClient};
    use crate::services::rate_limiter::RateLimiter;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use SentimentLabel::{Negative, Neutral, Positive};

    #[test]
    fn test_decode_newline_list() {
        let labels = decode_batch_labels("Positive\nNegative\nNeutral\n", 3).unwrap();
        assert_eq!(labels, vec![Positive, Negative, Neutral]);
    }

    #[test]
    fn test_decode_comma_and_pipe() {
        assert_eq!(
            decode_batch_labels("positive, NEGATIVE | Neutral", 3).unwrap(),
            vec![Positive, Negative, Neutral]
        );
    }

    #[test]
    fn test_decode_numbered_lines() {
        let raw = "1. Positive\n2) Negative.\nReview 3: **Neutral**";
        assert_eq!(decode_batch_labels(raw, 3).unwrap(), vec![Positive, Negative, Neutral]);
    }

    #[test]
    fn test_decode_count_mismatch() {
        assert_eq!(
            decode_batch_labels("Positive, Negative, Neutral, Positive", 3),
            Err(DecodeError::CountMismatch { expected: 3, found: 4 })
        );
        assert_eq!(
            decode_batch_labels("", 2),
            Err(DecodeError::CountMismatch { expected: 2, found: 0 })
        );
    }

    #[test]
    fn test_decode_rejects_unexpected_labels() {
        assert_eq!(
            decode_batch_labels("Positive\nMixed", 2),
            Err(DecodeError::UnrecognizedToken {
                position: 2,
                token: "Mixed".to_string()
            })
        );
    }

    #[test]
    fn test_decode_rejects_preamble_with_matching_count() {
        // Preamble plus two labels for three reviews: right count, wrong alignment
        let err = decode_batch_labels("Here are the labels\nPositive\nNegative", 3).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnrecognizedToken {
                position: 1,
                token: "Here are the labels".to_string()
            }
        );
    }

    #[test]
    fn test_decode_recovers_leading_label_from_chatty_lines() {
        let raw = "Positive - praises the service\nNegative - complains about waiting\nNeutral (no opinion)";
        assert_eq!(decode_batch_labels(raw, 3).unwrap(), vec![Positive, Negative, Neutral]);
    }

    #[test]
    fn test_decode_single_label() {
        assert_eq!(decode_single_label(" Positive.\n"), Positive);
        assert_eq!(decode_single_label("The sentiment is negative."), Negative);
        assert_eq!(decode_single_label("Mixed"), SentimentLabel::Other("Mixed".to_string()));
        assert_eq!(decode_single_label(""), SentimentLabel::Unknown);
        assert_eq!(
            decode_single_label("I cannot determine this from the text given"),
            SentimentLabel::Unknown
        );
    }

    #[test]
    fn test_batch_prompt_numbers_reviews_on_one_line_each() {
        let prompt = build_batch_prompt(&["Great fit", "Seams tore\nafter one wash"]);
        assert!(prompt.contains("exactly 2 lines"));
        assert!(prompt.contains("1. Great fit\n2. Seams tore after one wash"));
    }

    #[test]
    fn test_single_prompt_format() {
        let prompt = build_single_prompt("Love it");
        assert!(prompt.starts_with("You are a sentiment classifier for a clothing brand."));
        assert!(prompt.contains("Respond with exactly one word: Positive, Negative, or Neutral."));
        assert!(prompt.ends_with("Review: Love it"));
    }

    #[test]
    fn test_classification_rules_wording() {
        let prompt = build_single_prompt("Love it");
        assert!(prompt.contains(
            "\n• If the everything in the customer review is positive only then retun Positive\n"
        ));
    }

    /// Replies with a fixed batch answer and per-review single answers
    struct ReplayClient {
        batch_reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionClient for ReplayClient {
        fn name(&self) -> &'static str {
            "replay"
        }

        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if prompt.contains("Reviews:\n") {
                return Ok(self.batch_reply.clone());
            }
            let reply = if prompt.ends_with("Review: good") {
                "Positive"
            } else if prompt.ends_with("Review: bad") {
                "Negative"
            } else {
                "Neutral"
            };
            Ok(reply.to_string())
        }
    }

    fn classifier(batch_reply: &str) -> (SentimentClassifier, Arc<ReplayClient>) {
        let client = Arc::new(ReplayClient {
            batch_reply: batch_reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let gateway = LlmGateway::new(client.clone(), Arc::new(RateLimiter::unlimited()), CallPolicy::default());
        (SentimentClassifier::new(gateway), client)
    }

    #[tokio::test]
    async fn test_aligned_batch_uses_one_call() {
        let (classifier, client) = classifier("Positive\nNegative\nNeutral");

        let labels = classifier.classify_batch(&["good", "bad", "meh"]).await.unwrap();

        assert_eq!(labels, vec![Positive, Negative, Neutral]);
        assert_eq!(client.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mismatch_falls_back_to_single_calls() {
        // Extra token would shift every label by one if applied positionally
        let (classifier, client) = classifier("Neutral, Positive, Negative, Neutral");

        let labels = classifier.classify_batch(&["good", "bad", "meh"]).await.unwrap();

        assert_eq!(labels, vec![Positive, Negative, Neutral]);
        assert_eq!(client.prompts.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_preamble_falls_back_to_single_calls() {
        let (classifier, client) = classifier("Here are the labels\nPositive\nNegative");

        let labels = classifier.classify_batch(&["good", "bad", "meh"]).await.unwrap();

        assert_eq!(labels, vec![Positive, Negative, Neutral]);
        assert_eq!(client.prompts.lock().unwrap().len(), 4);
    }
}
