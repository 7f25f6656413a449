//! Provider call throttling and review batching
//!
//! The limiter is a fixed-interval gate: consecutive `wait()` calls return at
//! least `min_interval` apart. Callers that arrive early are delayed, never
//! rejected. Time comes from tokio's clock, so tests run it with a paused
//! runtime instead of real sleeps.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Rate limiter enforcing a minimum spacing between provider calls
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    pub fn from_millis(min_interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_interval_ms))
    }

    /// Limiter that never waits
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait if necessary to comply with the rate limit
    ///
    /// The lock is held across the sleep, so concurrent callers queue up and
    /// are released one interval apart.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let ready_at = last_time + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                tracing::debug!("Rate limiting: waiting {:?}", ready_at - now);
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Split `items` into consecutive batches of at most `batch_size`
///
/// Order is preserved and concatenating the batches yields `items`.
/// A `batch_size` of 0 is treated as 1.
pub fn chunk<T>(items: &[T], batch_size: usize) -> Vec<&[T]> {
    items.chunks(batch_size.max(1)).collect()
}
