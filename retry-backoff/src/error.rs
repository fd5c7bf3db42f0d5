//! Error types.
//!
//! The delay calculation itself never fails. These errors only surface at
//! the edges: validating a configuration and parsing a `Retry-After` value
//! on its own.

use std::time::Duration;
use thiserror::Error;

/// Errors from validating a [`BackoffConfig`](crate::BackoffConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The maximum delay is below the minimum delay.
    #[error("max delay {max:?} is below min delay {min:?}")]
    InvertedBounds {
        /// Configured minimum delay.
        min: Duration,
        /// Configured maximum delay.
        max: Duration,
    },
}

impl ConfigError {
    /// Create an inverted bounds error.
    pub fn inverted(min: Duration, max: Duration) -> Self {
        Self::InvertedBounds { min, max }
    }
}

/// Errors from parsing a `Retry-After` header value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryAfterError {
    /// The header value was empty.
    #[error("empty Retry-After value")]
    Empty,

    /// The header value is not a non-negative integer number of seconds.
    #[error("invalid Retry-After value: {0:?}")]
    Invalid(String),
}

impl RetryAfterError {
    /// Create an invalid value error.
    pub fn invalid(value: impl Into<String>) -> Self {
        Self::Invalid(value.into())
    }
}
