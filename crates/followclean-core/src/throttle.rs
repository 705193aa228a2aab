//! Randomized pacing between consecutive unfollows.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Closed interval the inter-account wait is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleWindow {
    pub min: Duration,
    pub max: Duration,
}

impl Default for ThrottleWindow {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(3),
            max: Duration::from_secs(7),
        }
    }
}

impl ThrottleWindow {
    /// A window with the bounds put in order.
    pub fn new(a: Duration, b: Duration) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Fixed wait, mostly for tests.
    pub fn fixed(wait: Duration) -> Self {
        Self::new(wait, wait)
    }

    /// Uniform sample at millisecond resolution.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Duration {
        let lo = self.min.as_millis().min(u64::MAX as u128) as u64;
        let hi = self.max.as_millis().min(u64::MAX as u128) as u64;
        if hi <= lo {
            return Duration::from_millis(lo);
        }
        Duration::from_millis(rng.u64(lo..=hi))
    }
}

/// A [`ThrottleWindow`] with its own random source.
pub(crate) struct Throttle {
    window: ThrottleWindow,
    rng: Mutex<fastrand::Rng>,
}

impl Throttle {
    pub(crate) fn new(window: ThrottleWindow) -> Self {
        Self {
            window,
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    pub(crate) fn next_wait(&self) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.window.sample(&mut rng)
    }
}
