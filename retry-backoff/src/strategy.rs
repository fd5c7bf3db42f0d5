//! Backoff trait.

use crate::response::RetryResponse;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Decides how long to wait before a retry.
///
/// Implementations only compute delays. Counting attempts and deciding
/// whether to retry at all is left to the caller.
#[async_trait]
pub trait Backoff: Send + Sync {
    /// Delay before retry `attempt` (zero-based), given the response that
    /// triggered it, if any.
    fn delay(&self, attempt: u32, resp: Option<&dyn RetryResponse>) -> Duration;

    /// Sleep for [`delay`](Backoff::delay) and return how long was waited.
    async fn wait(&self, attempt: u32, resp: Option<&(dyn RetryResponse + Sync)>) -> Duration {
        let delay = self.delay(attempt, resp.map(|r| r as &dyn RetryResponse));
        debug!(attempt, wait_ms = delay.as_millis(), "Waiting before retry");
        sleep(delay).await;
        delay
    }
}

/// Backoff that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackoff;

impl NoBackoff {
    /// Create a new no-wait backoff.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Backoff for NoBackoff {
    fn delay(&self, _attempt: u32, _resp: Option<&dyn RetryResponse>) -> Duration {
        Duration::ZERO
    }
}
