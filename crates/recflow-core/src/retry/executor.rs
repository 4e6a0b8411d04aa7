//! Retry execution engine: runs an operation under a policy until success,
//! a non-retryable failure, exhaustion, or caller abort.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::Failure;

use super::error::RetryError;
use super::hooks::{NoopHooks, RetryHooks};
use super::policy::{RetryDecision, RetryPolicy};

/// Shared flag a caller can set to abandon a retry run.
///
/// Checked only at the wait boundary between attempts: an in-flight
/// attempt always settles before the abort is honored, and no side effects
/// from a not-yet-issued attempt are created.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request abort; the executor stops at the next wait boundary.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Executes operations under a `RetryPolicy`, with observable lifecycle
/// hooks. Bound once and reused, so hook state (logging context, counters)
/// persists across calls.
pub struct RetryExecutor<H = NoopHooks> {
    policy: RetryPolicy,
    hooks: H,
    abort: Option<AbortToken>,
}

impl RetryExecutor<NoopHooks> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            hooks: NoopHooks,
            abort: None,
        }
    }
}

impl<H: RetryHooks> RetryExecutor<H> {
    /// Replace the hooks, keeping policy and abort token.
    pub fn with_hooks<H2: RetryHooks>(self, hooks: H2) -> RetryExecutor<H2> {
        RetryExecutor {
            policy: self.policy,
            hooks,
            abort: self.abort,
        }
    }

    /// Attach an abort token checked at wait boundaries.
    pub fn with_abort_token(mut self, token: AbortToken) -> Self {
        self.abort = Some(token);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds, fails with a non-retryable kind, the
    /// attempt budget is spent, or the abort token is set at a wait
    /// boundary. The attempt counter starts at 1 and never exceeds the
    /// policy's `max_attempts`.
    pub async fn execute<F, Fut, T>(&self, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Failure>>,
    {
        let start = Instant::now();
        let mut attempt = 1u32;
        loop {
            self.hooks.before_attempt(attempt, self.policy.max_attempts());
            match op().await {
                Ok(value) => {
                    self.hooks.after_attempt(attempt, start.elapsed());
                    return Ok(value);
                }
                Err(failure) => match self.policy.decide(attempt, failure.kind()) {
                    RetryDecision::NoRetry => {
                        if self.policy.is_retryable(failure.kind()) {
                            self.hooks.on_exhausted(attempt, &failure);
                            return Err(RetryError::Exhausted {
                                attempts: attempt,
                                last: failure,
                            });
                        }
                        return Err(RetryError::NonRetryable {
                            attempt,
                            cause: failure,
                        });
                    }
                    RetryDecision::RetryAfter(delay) => {
                        self.hooks.on_attempt_failure(attempt, &failure, delay);
                        self.hooks.before_wait(delay);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        self.hooks.after_wait();
                        if let Some(token) = &self.abort {
                            if token.is_aborted() {
                                return Err(RetryError::Aborted {
                                    attempts: attempt,
                                    last: Some(failure),
                                });
                            }
                        }
                        attempt += 1;
                    }
                },
            }
        }
    }
}

/// Runs `op` under `policy` with no hooks. Convenience for one-off calls;
/// for persistent hooks or cancellation, build a `RetryExecutor`.
pub async fn run_with_retry<F, Fut, T>(policy: &RetryPolicy, op: F) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Failure>>,
{
    RetryExecutor::new(policy.clone()).execute(op).await
}
