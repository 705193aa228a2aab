//! Bounded polling: run a probe up to N times with a fixed pause between
//! attempts.
//!
//! Every wait in the pipeline that depends on the page catching up (the
//! scanner's scroll loop, row location, the confirmation dialog) goes through
//! this so that none of them can spin forever.

use std::future::Future;
use std::time::Duration;

/// Attempt budget plus the pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedPoll {
    /// `None` means no cap; the caller must have its own exit condition.
    pub max_attempts: Option<usize>,
    pub delay: Duration,
}

impl BoundedPoll {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            delay,
        }
    }

    pub fn unbounded(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
        }
    }

    pub fn attempts(&self) -> Attempts {
        Attempts {
            poll: *self,
            next: 0,
        }
    }

    /// Run `probe` until it yields a value or the budget runs out.
    ///
    /// The probe receives the zero-based attempt number. The pause happens
    /// between attempts, never before the first.
    pub async fn until<T, F, Fut>(&self, mut probe: F) -> Option<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let mut attempts = self.attempts();
        while let Some(attempt) = attempts.next().await {
            if let Some(value) = probe(attempt).await {
                return Some(value);
            }
        }
        None
    }
}

/// Attempt counter handed out by [`BoundedPoll::attempts`].
#[derive(Debug)]
pub struct Attempts {
    poll: BoundedPoll,
    next: usize,
}

impl Attempts {
    /// Wait out the inter-attempt delay and return the next attempt number,
    /// or `None` once the budget is spent.
    pub async fn next(&mut self) -> Option<usize> {
        if self.poll.max_attempts.is_some_and(|max| self.next >= max) {
            return None;
        }
        if self.next > 0 && !self.poll.delay.is_zero() {
            tokio::time::sleep(self.poll.delay).await;
        }
        let attempt = self.next;
        self.next += 1;
        Some(attempt)
    }

    /// Attempts handed out so far.
    pub fn used(&self) -> usize {
        self.next
    }
}
