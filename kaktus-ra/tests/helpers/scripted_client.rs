//! Deterministic provider stub
//!
//! Answers each prompt kind the way a well-behaved model would, using a fixed
//! review → label table. Individual behaviours can be overridden to simulate
//! misaligned batch replies or provider failures.

use async_trait::async_trait;
use kaktus_ra::llm::{CompletionClient, LlmError};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::time::Instant;

/// Prompt kind, recognised by its fixed wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Batch,
    Single,
    PositiveInsight,
    NegativeInsight,
    Summary,
}

impl PromptKind {
    pub fn of(prompt: &str) -> Option<Self> {
        if prompt.contains("Insights:\n") {
            Some(PromptKind::Summary)
        } else if prompt.contains("actionable insight from a POSITIVE") {
            Some(PromptKind::PositiveInsight)
        } else if prompt.contains("actionable insight from a NEGATIVE") {
            Some(PromptKind::NegativeInsight)
        } else if prompt.contains("Reviews:\n") {
            Some(PromptKind::Batch)
        } else if prompt.contains("Respond with exactly one word") {
            Some(PromptKind::Single)
        } else {
            None
        }
    }
}

/// One recorded provider call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub at: Instant,
    pub kind: Option<PromptKind>,
    pub prompt: String,
}

#[derive(Default)]
pub struct ScriptedClient {
    labels: HashMap<String, String>,
    batch_reply: Option<String>,
    fail_on: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    /// `labels`: review text → label word the stub answers with
    pub fn new(labels: &[(&str, &str)]) -> Self {
        Self {
            labels: labels
                .iter()
                .map(|(review, label)| (review.to_string(), label.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Answer every batch prompt with this raw text
    pub fn with_batch_reply(mut self, reply: &str) -> Self {
        self.batch_reply = Some(reply.to_string());
        self
    }

    /// Fail every prompt that contains `needle`
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: PromptKind) -> usize {
        self.calls().iter().filter(|c| c.kind == Some(kind)).count()
    }

    /// Prompts of one kind, in call order
    pub fn prompts(&self, kind: PromptKind) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind == Some(kind))
            .map(|c| c.prompt)
            .collect()
    }

    fn label_for(&self, review: &str) -> String {
        self.labels
            .get(review.trim())
            .cloned()
            .unwrap_or_else(|| "Neutral".to_string())
    }

    fn batch_answer(&self, prompt: &str) -> String {
        if let Some(reply) = &self.batch_reply {
            return reply.clone();
        }
        let listing = prompt.rsplit("Reviews:\n").next().unwrap_or_default();
        listing
            .lines()
            .filter_map(|line| line.split_once(". "))
            .map(|(_, review)| self.label_for(review))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn review_of(prompt: &str) -> &str {
    prompt.rsplit("Review: ").next().unwrap_or_default().trim()
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let kind = PromptKind::of(prompt);
        self.calls.lock().unwrap().push(RecordedCall {
            at: Instant::now(),
            kind,
            prompt: prompt.to_string(),
        });

        if let Some(needle) = &self.fail_on {
            if prompt.contains(needle.as_str()) {
                return Err(LlmError::Api(503, "scripted failure".to_string()));
            }
        }

        match kind {
            Some(PromptKind::Batch) => Ok(self.batch_answer(prompt)),
            Some(PromptKind::Single) => Ok(self.label_for(review_of(prompt))),
            Some(PromptKind::PositiveInsight) => Ok(format!("Praised: {}", review_of(prompt))),
            Some(PromptKind::NegativeInsight) => Ok(format!("Fix: {}", review_of(prompt))),
            Some(PromptKind::Summary) if prompt.contains("\"Delighters\"") => {
                Ok("- Delighters: customers love the service".to_string())
            }
            Some(PromptKind::Summary) => Ok("- Detractors: shorten wait times".to_string()),
            None => Err(LlmError::MalformedResponse("unexpected prompt".to_string())),
        }
    }
}
