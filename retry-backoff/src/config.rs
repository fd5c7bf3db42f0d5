//! Backoff configuration.

use crate::backoff::ExponentialJitterBackoff;
use crate::error::ConfigError;
use crate::jitter::JitterSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Serializable bounds for [`ExponentialJitterBackoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub min_delay: Duration,
    /// Ceiling for the exponential delay.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl BackoffConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the min delay.
    pub fn min_delay(mut self, d: Duration) -> Self {
        self.min_delay = d;
        self
    }

    /// Set the max delay.
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// Set both bounds.
    pub fn bounds(self, min: Duration, max: Duration) -> Self {
        self.min_delay(min).max_delay(max)
    }

    /// Check that `max_delay >= min_delay`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_delay < self.min_delay {
            return Err(ConfigError::inverted(self.min_delay, self.max_delay));
        }
        Ok(())
    }

    /// Build a backoff that draws jitter from the thread RNG.
    pub fn build(&self) -> ExponentialJitterBackoff {
        ExponentialJitterBackoff::new(self.min_delay, self.max_delay)
    }

    /// Build a backoff with a custom jitter source.
    pub fn build_with(&self, jitter: Arc<dyn JitterSource>) -> ExponentialJitterBackoff {
        ExponentialJitterBackoff::builder()
            .min_delay(self.min_delay)
            .max_delay(self.max_delay)
            .jitter_source(jitter)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::NoJitter;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = BackoffConfig::default();
        assert_eq!(config.min_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = BackoffConfig::new()
            .min_delay(Duration::from_millis(250))
            .max_delay(Duration::from_secs(5));

        assert_eq!(config.min_delay, Duration::from_millis(250));
        assert_eq!(config.max_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_validate_inverted() {
        let (min, max) = (Duration::from_secs(10), Duration::from_secs(2));
        let config = BackoffConfig::new().bounds(min, max);
        assert_eq!(config.validate(), Err(ConfigError::inverted(min, max)));
    }

    #[test]
    fn test_validate_equal_bounds() {
        let bound = Duration::from_secs(3);
        let config = BackoffConfig::new().bounds(bound, bound);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_with() {
        let backoff = BackoffConfig::new()
            .bounds(Duration::from_millis(100), Duration::from_secs(1))
            .build_with(Arc::new(NoJitter));

        assert_eq!(backoff.calculate_delay(2, None), Duration::from_millis(400));
        assert_eq!(backoff.calculate_delay(4, None), Duration::from_secs(1));
    }

    #[test]
    fn test_build() {
        let backoff = BackoffConfig::default().build();
        assert_eq!(backoff.min_delay, Duration::from_secs(1));
        assert_eq!(backoff.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn test_serde_round_trip() {
        let (min, max) = (Duration::from_millis(1500), Duration::from_secs(45));
        let config = BackoffConfig::new().bounds(min, max);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: BackoffConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_serde_defaults_missing_fields() {
        let json = r#"{"max_delay":{"secs":5,"nanos":0}}"#;
        let parsed: BackoffConfig = serde_json::from_str(json).unwrap();
        let expected = BackoffConfig::new().max_delay(Duration::from_secs(5));
        assert_eq!(parsed, expected);

        let parsed: BackoffConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, BackoffConfig::default());
    }
}
