//! Lifecycle hooks observed by the retry executor.
//!
//! Hooks are injectable observers, not a process-wide logging singleton:
//! the executor calls them around every attempt and every wait.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Failure;

/// Extension points invoked by `RetryExecutor`.
///
/// Every method defaults to a no-op so implementors override only what
/// they need. Hook implementations must not fail; anything fallible
/// belongs in the operation itself.
pub trait RetryHooks: Send + Sync {
    /// About to run attempt `attempt` of at most `max_attempts`.
    fn before_attempt(&self, attempt: u32, max_attempts: u32) {
        let _ = (attempt, max_attempts);
    }

    /// Attempt `attempt` succeeded; `elapsed` is the time since the run started.
    fn after_attempt(&self, attempt: u32, elapsed: Duration) {
        let _ = (attempt, elapsed);
    }

    /// Attempt `attempt` failed with a retryable failure; the executor will
    /// wait `delay` and try again.
    fn on_attempt_failure(&self, attempt: u32, failure: &Failure, delay: Duration) {
        let _ = (attempt, failure, delay);
    }

    /// The attempt budget is spent and the last attempt still failed.
    fn on_exhausted(&self, attempts: u32, failure: &Failure) {
        let _ = (attempts, failure);
    }

    /// About to sleep for `delay` before the next attempt.
    fn before_wait(&self, delay: Duration) {
        let _ = delay;
    }

    /// The inter-attempt sleep finished.
    fn after_wait(&self) {}
}

/// Hooks that do nothing. The executor's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl RetryHooks for NoopHooks {}

/// Hooks that log through `tracing`, tagged with an operation name.
///
/// Failures that will be retried log at WARN, exhaustion at ERROR,
/// everything else at DEBUG.
#[derive(Debug, Clone)]
pub struct TracingHooks {
    operation: String,
}

impl TracingHooks {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }
}

impl RetryHooks for TracingHooks {
    fn before_attempt(&self, attempt: u32, max_attempts: u32) {
        tracing::debug!(
            operation = %self.operation,
            attempt,
            max_attempts,
            "starting attempt"
        );
    }

    fn after_attempt(&self, attempt: u32, elapsed: Duration) {
        tracing::debug!(
            operation = %self.operation,
            attempt,
            elapsed_ms = elapsed.as_millis() as u64,
            "attempt succeeded"
        );
    }

    fn on_attempt_failure(&self, attempt: u32, failure: &Failure, delay: Duration) {
        tracing::warn!(
            operation = %self.operation,
            attempt,
            kind = %failure.kind(),
            error = %failure,
            delay_ms = delay.as_millis() as u64,
            "attempt failed, will retry"
        );
    }

    fn on_exhausted(&self, attempts: u32, failure: &Failure) {
        tracing::error!(
            operation = %self.operation,
            attempts,
            error = %failure,
            "retry attempts exhausted"
        );
    }

    fn before_wait(&self, delay: Duration) {
        tracing::debug!(
            operation = %self.operation,
            delay_ms = delay.as_millis() as u64,
            "waiting before next attempt"
        );
    }
}

impl<T: RetryHooks + ?Sized> RetryHooks for Arc<T> {
    fn before_attempt(&self, attempt: u32, max_attempts: u32) {
        (**self).before_attempt(attempt, max_attempts)
    }

    fn after_attempt(&self, attempt: u32, elapsed: Duration) {
        (**self).after_attempt(attempt, elapsed)
    }

    fn on_attempt_failure(&self, attempt: u32, failure: &Failure, delay: Duration) {
        (**self).on_attempt_failure(attempt, failure, delay)
    }

    fn on_exhausted(&self, attempts: u32, failure: &Failure) {
        (**self).on_exhausted(attempts, failure)
    }

    fn before_wait(&self, delay: Duration) {
        (**self).before_wait(delay)
    }

    fn after_wait(&self) {
        (**self).after_wait()
    }
}
