//! Randomness sources for jitter.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws used to randomize delays.
///
/// Each call to [`sample`](JitterSource::sample) should return a fresh value
/// in `[0.0, 1.0)`. Values outside that range are clamped by the caller.
pub trait JitterSource: Send + Sync {
    /// Draw a value in `[0.0, 1.0)`.
    fn sample(&self) -> f64;
}

/// Draws from the thread-local RNG on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl ThreadRngJitter {
    /// Create a new thread RNG source.
    pub fn new() -> Self {
        Self
    }
}

impl JitterSource for ThreadRngJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible source seeded from a `u64`.
///
/// Calls from multiple threads are serialized; the sequence of draws is
/// deterministic for a given seed and call order.
#[derive(Debug)]
pub struct SeededJitter {
    rng: Mutex<StdRng>,
}

impl SeededJitter {
    /// Create a seeded source.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl JitterSource for SeededJitter {
    fn sample(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }
}

/// Always returns the same fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedJitter(f64);

impl FixedJitter {
    /// Create a fixed source. The fraction is clamped into `[0.0, 1.0]`.
    pub fn new(fraction: f64) -> Self {
        Self(clamp_unit(fraction))
    }

    /// The fraction this source returns.
    pub fn fraction(&self) -> f64 {
        self.0
    }
}

impl JitterSource for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}

/// Never adds jitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn sample(&self) -> f64 {
        0.0
    }
}

/// Clamp a draw into `[0.0, 1.0]`, mapping NaN to zero.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
