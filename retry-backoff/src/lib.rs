//! # retry-backoff
//!
//! Retry delays for HTTP clients: exponential backoff with jitter that
//! defers to the server's `Retry-After` header on rate limiting.
//!
//! ## Core Concepts
//!
//! - **[`exponential_backoff_with_jitter`]**: Compute the delay before a retry
//! - **[`ExponentialJitterBackoff`]**: Bounds plus a jitter source, reusable across calls
//! - **[`JitterSource`]**: Where randomness comes from
//! - **[`RetryResponse`]**: The status and headers of the response being retried
//! - **[`Backoff`]**: Pluggable delay strategy with an async `wait`
//! - **[`BackoffConfig`]**: Serializable bounds
//!
//! ## How the delay is chosen
//!
//! 1. A 429 response with `Retry-After: <seconds>` uses that many seconds.
//! 2. Otherwise the delay is `min * 2^attempt`.
//! 3. If that reaches `max`, exactly `max` is returned.
//! 4. Anything not capped gets up to 25% extra added at random.
//!
//! ## Example
//!
//! ```
//! use retry_backoff::{exponential_backoff_with_jitter, ResponseInfo};
//! use std::time::Duration;
//!
//! let min = Duration::from_secs(1);
//! let max = Duration::from_secs(30);
//!
//! // No response: exponential path.
//! let delay = exponential_backoff_with_jitter(min, max, 0, None);
//! assert!(delay >= min && delay <= Duration::from_millis(1250));
//!
//! // Rate limited: the server decides.
//! let resp = ResponseInfo::rate_limited("7");
//! let delay = exponential_backoff_with_jitter(min, max, 2, Some(&resp));
//! assert!(delay >= Duration::from_secs(7));
//! ```
//!
//! ## Deterministic delays
//!
//! ```
//! use retry_backoff::ExponentialJitterBackoff;
//! use std::time::Duration;
//!
//! let backoff = ExponentialJitterBackoff::builder()
//!     .min_delay(Duration::from_millis(100))
//!     .max_delay(Duration::from_secs(10))
//!     .no_jitter()
//!     .build();
//!
//! assert_eq!(backoff.calculate_delay(3, None), Duration::from_millis(800));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backoff;
pub mod config;
pub mod error;
pub mod jitter;
pub mod response;
pub mod strategy;

// Re-exports
pub use backoff::{
    exponential_backoff_with_jitter, exponential_backoff_with_jitter_from,
    ExponentialJitterBackoff, ExponentialJitterBackoffBuilder, JITTER_FACTOR,
};
pub use config::BackoffConfig;
pub use error::{ConfigError, RetryAfterError};
pub use jitter::{FixedJitter, JitterSource, NoJitter, SeededJitter, ThreadRngJitter};
pub use response::{parse_retry_after, ResponseInfo, RetryResponse};
pub use strategy::{Backoff, NoBackoff};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        exponential_backoff_with_jitter, Backoff, BackoffConfig, ExponentialJitterBackoff,
        JitterSource, ResponseInfo, RetryResponse,
    };
}
