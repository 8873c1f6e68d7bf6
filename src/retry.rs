//! Retry policy: produces a (possibly infinite) sequence of delays for a
//! failing event.

use backoff::backoff::Backoff as BackoffTrait;
use std::time::Duration;

/// Bounded-exponential retry schedule.
///
/// `delay_n = min(initial * multiplier^n, max_interval)`, optionally capped
/// at `max_attempts`. A policy is a value, not a singleton: clone it freely
/// and attach a fresh [`RetryPolicy::cursor`] per event, so that different
/// event sources (or different objects) can run independent schedules.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    initial: Duration,
    multiplier: f64,
    max_interval: Duration,
    max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// The framework's default ("generic") policy: 1s initial delay, 2x
    /// multiplier, capped at 5 minutes, unbounded attempts.
    pub fn generic() -> Self {
        Self {
            initial: Duration::from_secs(1),
            multiplier: 2.0,
            max_interval: Duration::from_secs(5 * 60),
            max_attempts: None,
        }
    }

    #[must_use]
    pub fn with_initial_interval(mut self, d: Duration) -> Self {
        self.initial = d;
        self
    }

    #[must_use]
    pub fn with_multiplier(mut self, m: f64) -> Self {
        self.multiplier = m;
        self
    }

    #[must_use]
    pub fn with_max_interval(mut self, d: Duration) -> Self {
        self.max_interval = d;
        self
    }

    /// Caps the number of attempts. `max_attempts = 1` disables retry: the
    /// first failure is already terminal.
    #[must_use]
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }

    /// The delay before attempt `n` (0-indexed), or `None` if retries are
    /// exhausted at that attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return None;
            }
        }
        let scaled = self.initial.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = scaled.min(self.max_interval.as_secs_f64()).max(0.0);
        Some(Duration::from_secs_f64(capped))
    }

    /// A stateful cursor over this policy, suitable for an event source's
    /// own retry loop, or for handing straight to `backoff::future::retry`.
    pub fn cursor(&self) -> RetryCursor {
        RetryCursor {
            policy: self.clone(),
            attempt: 0,
        }
    }
}

/// Stateful iterator over a [`RetryPolicy`]: "given the ordinal of the
/// current attempt, yields either a delay or a signal that retries are
/// exhausted."
#[derive(Debug, Clone)]
pub struct RetryCursor {
    policy: RetryPolicy,
    attempt: u32,
}

impl Iterator for RetryCursor {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.policy.delay_for_attempt(self.attempt)?;
        self.attempt += 1;
        Some(delay)
    }
}

/// Lets a [`RetryCursor`] plug directly into `backoff`-based retry helpers,
/// the way `kube_runtime::observer::Observer` already depends on
/// `backoff::ExponentialBackoff`.
impl BackoffTrait for RetryCursor {
    fn next_backoff(&mut self) -> Option<Duration> {
        Iterator::next(self)
    }

    fn reset(&mut self) {
        self.attempt = 0;
    }
}
