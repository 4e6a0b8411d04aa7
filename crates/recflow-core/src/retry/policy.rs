//! Retry policy: attempt budget, inter-attempt delay, and which failure
//! kinds qualify for another attempt.

use std::collections::HashSet;
use std::time::Duration;

use crate::error::FailureKind;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this failure.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Fixed-delay retry policy. Immutable once built.
///
/// With no explicit kind set, every failure kind is retryable; `retry_on`
/// narrows retry to the listed kinds.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    retryable_kinds: Option<HashSet<FailureKind>>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(250),
            retryable_kinds: None,
        }
    }
}

impl RetryPolicy {
    /// New policy with the given attempt budget (including the first
    /// attempt) and fixed inter-attempt delay. A budget of 0 is clamped
    /// to 1: every operation gets at least one attempt.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            retryable_kinds: None,
        }
    }

    /// Restrict retry to the given failure kinds.
    pub fn retry_on(mut self, kinds: impl IntoIterator<Item = FailureKind>) -> Self {
        self.retryable_kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a failure of this kind qualifies for another attempt at all.
    pub fn is_retryable(&self, kind: FailureKind) -> bool {
        match &self.retryable_kinds {
            Some(kinds) => kinds.contains(&kind),
            None => true,
        }
    }

    /// Decide what to do after attempt `attempt` (1-based) failed with
    /// `kind`. Returns `NoRetry` when the kind is excluded or the budget
    /// is spent.
    pub fn decide(&self, attempt: u32, kind: FailureKind) -> RetryDecision {
        if !self.is_retryable(kind) {
            return RetryDecision::NoRetry;
        }
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay)
    }
}
