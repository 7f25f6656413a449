//! LLM completion provider integration
//!
//! - [`CompletionClient`]: one prompt in, one text completion out
//! - [`GroqClient`]: OpenAI-compatible `chat/completions` over HTTP
//! - [`LlmGateway`]: shared rate limiter, per-call timeout and retry policy

pub mod gateway;
pub mod groq_client;

pub use gateway::{CallPolicy, LlmGateway};
pub use groq_client::GroqClient;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Provider call errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Provider credentials not configured")]
    MissingCredentials,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl LlmError {
    /// Configuration problems are never retried
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LlmError::MissingCredentials)
    }
}

/// Black-box text completion provider
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Send a single user-role prompt and return the completion text
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
