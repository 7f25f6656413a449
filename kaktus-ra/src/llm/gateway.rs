//! Single entry point for every outbound provider call
//!
//! Each attempt passes the shared [`RateLimiter`], then runs under the
//! per-call timeout. Failed attempts are retried up to `max_retries` times with
//! linear backoff; every retry goes through the limiter again.

use std::sync::Arc;
use std::time::Duration;

use super::{CompletionClient, LlmError};
use crate::services::rate_limiter::RateLimiter;
use kaktus_common::config::TomlConfig;

/// Timeout and retry settings applied to each call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 1,
            retry_backoff: Duration::from_millis(2000),
        }
    }
}

impl CallPolicy {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.provider.timeout_seconds),
            max_retries: config.analysis.max_retries,
            retry_backoff: Duration::from_millis(config.analysis.retry_backoff_ms),
        }
    }
}

/// Rate-limited, timed, retried access to a [`CompletionClient`]
#[derive(Clone)]
pub struct LlmGateway {
    client: Arc<dyn CompletionClient>,
    rate_limiter: Arc<RateLimiter>,
    policy: CallPolicy,
}

impl LlmGateway {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        rate_limiter: Arc<RateLimiter>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            client,
            rate_limiter,
            policy,
        }
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut attempt: u32 = 0;

        loop {
            self.rate_limiter.wait().await;

            let result = match tokio::time::timeout(self.policy.timeout, self.client.complete(prompt)).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout(self.policy.timeout)),
            };

            match result {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let backoff = self.policy.retry_backoff * attempt;
                    tracing::warn!(
                        provider = self.client.name(),
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Provider call failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    tracing::error!(
                        provider = self.client.name(),
                        attempts = attempt + 1,
                        error = %e,
                        "Provider call failed"
                    );
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Fails the first `failures` calls, then answers "ok"
    struct FlakyClient {
        failures: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionClient for FlakyClient {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(LlmError::Api(503, "busy".to_string()))
            } else {
                Ok("ok".to_string())
            }
        }
    }

    struct StuckClient;

    #[async_trait]
    impl CompletionClient for StuckClient {
        fn name(&self) -> &'static str {
            "stuck"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            std::future::pending().await
        }
    }

    struct UnconfiguredClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionClient for UnconfiguredClient {
        fn name(&self) -> &'static str {
            "unconfigured"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::MissingCredentials)
        }
    }

    fn gateway(client: Arc<dyn CompletionClient>, interval_ms: u64) -> LlmGateway {
        LlmGateway::new(
            client,
            Arc::new(RateLimiter::from_millis(interval_ms)),
            CallPolicy::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_retry_recovers() {
        let client = Arc::new(FlakyClient {
            failures: 1,
            calls: AtomicUsize::new(0),
        });
        let gateway = gateway(client.clone(), 0);

        let text = gateway.complete("prompt").await.unwrap();

        assert_eq!(text, "ok");
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let client = Arc::new(FlakyClient {
            failures: 5,
            calls: AtomicUsize::new(0),
        });
        let gateway = gateway(client.clone(), 0);

        let err = gateway.complete("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::Api(503, _)));
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_call_failure() {
        let gateway = gateway(Arc::new(StuckClient), 0);
        let start = Instant::now();

        let err = gateway.complete("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::Timeout(_)));
        // Two attempts of 60 s plus a 2 s backoff
        assert!(start.elapsed() >= Duration::from_secs(122));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_credentials_not_retried() {
        let client = Arc::new(UnconfiguredClient {
            calls: AtomicUsize::new(0),
        });
        let gateway = gateway(client.clone(), 0);

        let err = gateway.complete("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::MissingCredentials));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_respects_rate_limit() {
        let client = Arc::new(FlakyClient {
            failures: 1,
            calls: AtomicUsize::new(0),
        });
        let gateway = gateway(client, 4000);
        let start = Instant::now();

        gateway.complete("prompt").await.unwrap();

        // Backoff (2 s) is shorter than the interval, so the limiter decides
        assert!(start.elapsed() >= Duration::from_millis(4000));
    }
}
