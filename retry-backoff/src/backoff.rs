//! Exponential backoff with jitter.

use crate::jitter::{clamp_unit, JitterSource, NoJitter, SeededJitter, ThreadRngJitter};
use crate::response::RetryResponse;
use crate::strategy::Backoff;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Largest share of the base delay that jitter may add.
pub const JITTER_FACTOR: f64 = 0.25;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Compute how long to wait before retry `attempt` using the thread RNG.
///
/// See [`exponential_backoff_with_jitter_from`].
pub fn exponential_backoff_with_jitter(
    min: Duration,
    max: Duration,
    attempt: u32,
    resp: Option<&dyn RetryResponse>,
) -> Duration {
    exponential_backoff_with_jitter_from(&ThreadRngJitter, min, max, attempt, resp)
}

/// Compute how long to wait before retry `attempt`.
///
/// `attempt` is zero-based: `0` is the first retry after the original
/// request failed.
///
/// - A 429 response whose first `Retry-After` value is a whole number of
///   seconds wins outright. `min`, `max` and `attempt` are ignored.
/// - Otherwise the base delay is `min * 2^attempt`. If that reaches `max`
///   (or overflows), exactly `max` is returned with no jitter.
/// - Any uncapped delay gets up to [`JITTER_FACTOR`] of itself added on
///   top, so jittered delays may end up above `max`.
///
/// `max` below `min` is treated as if `max` were `min`. This function never
/// fails; an unusable `Retry-After` value is ignored.
pub fn exponential_backoff_with_jitter_from(
    jitter: &dyn JitterSource,
    min: Duration,
    max: Duration,
    attempt: u32,
    resp: Option<&dyn RetryResponse>,
) -> Duration {
    if let Some(retry_after) = resp
        .filter(|r| r.is_rate_limited())
        .and_then(|r| r.retry_after())
    {
        trace!(
            retry_after_secs = retry_after.as_secs(),
            "Using server-requested retry delay"
        );
        return add_jitter(retry_after, jitter);
    }

    let max = max.max(min);
    match exponential_base(min, attempt) {
        Some(base) if base < max => add_jitter(base, jitter),
        _ => {
            trace!(
                attempt,
                max_ms = max.as_millis(),
                "Backoff capped at max delay"
            );
            max
        }
    }
}

/// `min * 2^attempt`, or `None` if it does not fit in a `Duration`.
fn exponential_base(min: Duration, attempt: u32) -> Option<Duration> {
    if min.is_zero() {
        return Some(Duration::ZERO);
    }
    let factor = 1u128.checked_shl(attempt)?;
    min.as_nanos()
        .checked_mul(factor)
        .and_then(duration_from_nanos)
}

/// Add a uniform share in `[0, JITTER_FACTOR]` of `base` on top of it.
fn add_jitter(base: Duration, source: &dyn JitterSource) -> Duration {
    let nanos = base.as_nanos();
    let fraction = clamp_unit(source.sample()) * JITTER_FACTOR;
    // `as` truncates and saturates; the min keeps rounding inside the bound.
    let extra = ((nanos as f64 * fraction) as u128).min(nanos / 4);
    duration_from_nanos(nanos + extra).unwrap_or(Duration::MAX)
}

fn duration_from_nanos(nanos: u128) -> Option<Duration> {
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}

/// Exponential backoff bounded by a min and max delay, with jitter.
#[derive(Clone)]
pub struct ExponentialJitterBackoff {
    /// Base delay for the first retry.
    pub min_delay: Duration,
    /// Ceiling for the exponential delay.
    pub max_delay: Duration,
    jitter: Arc<dyn JitterSource>,
}

impl fmt::Debug for ExponentialJitterBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExponentialJitterBackoff")
            .field("min_delay", &self.min_delay)
            .field("max_delay", &self.max_delay)
            .finish_non_exhaustive()
    }
}

impl Default for ExponentialJitterBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30))
    }
}

impl ExponentialJitterBackoff {
    /// Create a backoff drawing jitter from the thread RNG.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay,
            jitter: Arc::new(ThreadRngJitter),
        }
    }

    /// Create a builder.
    #[must_use]
    pub fn builder() -> ExponentialJitterBackoffBuilder {
        ExponentialJitterBackoffBuilder::default()
    }

    /// Calculate the delay before retry `attempt`.
    pub fn calculate_delay(&self, attempt: u32, resp: Option<&dyn RetryResponse>) -> Duration {
        exponential_backoff_with_jitter_from(
            self.jitter.as_ref(),
            self.min_delay,
            self.max_delay,
            attempt,
            resp,
        )
    }
}

#[async_trait]
impl Backoff for ExponentialJitterBackoff {
    fn delay(&self, attempt: u32, resp: Option<&dyn RetryResponse>) -> Duration {
        self.calculate_delay(attempt, resp)
    }
}

/// Builder for [`ExponentialJitterBackoff`].
#[derive(Default)]
pub struct ExponentialJitterBackoffBuilder {
    min_delay: Option<Duration>,
    max_delay: Option<Duration>,
    jitter: Option<Arc<dyn JitterSource>>,
}

impl fmt::Debug for ExponentialJitterBackoffBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExponentialJitterBackoffBuilder")
            .field("min_delay", &self.min_delay)
            .field("max_delay", &self.max_delay)
            .field("custom_jitter", &self.jitter.is_some())
            .finish()
    }
}

impl ExponentialJitterBackoffBuilder {
    /// Set the min delay.
    #[must_use]
    pub fn min_delay(mut self, d: Duration) -> Self {
        self.min_delay = Some(d);
        self
    }

    /// Set the max delay.
    #[must_use]
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Use a custom jitter source.
    #[must_use]
    pub fn jitter_source(mut self, source: Arc<dyn JitterSource>) -> Self {
        self.jitter = Some(source);
        self
    }

    /// Draw jitter from a seeded RNG.
    #[must_use]
    pub fn seed(self, seed: u64) -> Self {
        self.jitter_source(Arc::new(SeededJitter::new(seed)))
    }

    /// Disable jitter.
    #[must_use]
    pub fn no_jitter(self) -> Self {
        self.jitter_source(Arc::new(NoJitter))
    }

    /// Build the backoff.
    #[must_use]
    pub fn build(self) -> ExponentialJitterBackoff {
        let mut backoff = ExponentialJitterBackoff::default();
        if let Some(v) = self.min_delay {
            backoff.min_delay = v;
        }
        if let Some(v) = self.max_delay {
            backoff.max_delay = v;
        }
        if let Some(v) = self.jitter {
            backoff.jitter = v;
        }
        backoff
    }
}
