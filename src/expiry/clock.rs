//! Clock sources
//!
//! All expiry math uses unix seconds as `f64`, the same unit persisted in
//! the backing file.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Source of the current time for expiry checks
pub trait Clock: Send + Sync {
    /// Seconds since the unix epoch
    fn now(&self) -> f64;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        // A clock set before 1970 reads as the epoch itself
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Manually driven clock for simulated time
///
/// Share it through an `Arc` with the engine and advance it from the test.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    /// Start the clock at `now` (unix seconds)
    pub fn new(now: f64) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by.as_secs_f64();
    }

    /// Jump to an absolute time
    pub fn set(&self, now: f64) {
        *self.now.lock() = now;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemClock.now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock()
    }
}
