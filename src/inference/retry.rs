//! Shared retry policy for remote inference calls.
//!
//! Every call site that talks to a remote endpoint uses this one policy
//! rather than growing its own loop with slightly different bounds.

use std::time::Duration;

/// Lower clamp applied to server-estimated cold-start waits.
const COLD_START_MIN: Duration = Duration::from_secs(4);
/// Upper clamp applied to server-estimated cold-start waits.
const COLD_START_MAX: Duration = Duration::from_secs(20);

/// Bounded retry schedule: a fixed attempt ceiling with exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_backoff: Duration,
}

impl RetryPolicy {
    /// Build a policy with the given attempt ceiling and base backoff.
    ///
    /// The ceiling is clamped to at least one attempt.
    pub fn new(max_attempts: usize, base_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    /// Total attempts permitted, including the first.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Backoff before retrying after the given 1-based failed attempt.
    ///
    /// Doubles per attempt: base, 2×base, 4×base, …
    pub fn backoff_for_attempt(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as u32;
        self.base_backoff.saturating_mul(1 << exponent)
    }

    /// Wait to apply when the endpoint reports a cold start.
    ///
    /// Trusts the server's `estimated_time` hint but clamps it: endpoints
    /// report sub-second estimates that are never accurate, and occasionally
    /// multi-minute ones not worth blocking a request on.
    pub fn cold_start_wait(&self, estimated_secs: Option<f64>) -> Duration {
        let estimated = estimated_secs
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or(COLD_START_MIN);
        estimated.clamp(COLD_START_MIN, COLD_START_MAX)
    }
}
