//! Fan-out dispatch: deliver one record to every target in a fixed set.
//!
//! A fan-out is an at-least-one-attempt-per-target broadcast, not an
//! all-or-nothing transaction: every target is attempted even when an
//! earlier one fails, per-target outcomes are aggregated, and the
//! dispatcher itself never retries a target. A target that wants retries
//! composes a `RetryExecutor` inside its own send.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{Failure, FailureKind};
use crate::listener::{DispatchEvent, DispatchListener, ListenerGroup};
use crate::record::Record;

/// Send capability of one downstream consumer. `id` is stable and used in
/// failure reporting.
#[async_trait]
pub trait DispatchTarget<P>: Send + Sync {
    fn id(&self) -> &str;

    async fn send(&self, record: &Record<P>) -> Result<(), Failure>;
}

/// Aggregated fan-out failure naming every target that failed, in target
/// registration order.
#[derive(Debug)]
pub struct DispatchFailure {
    failures: Vec<(String, Failure)>,
}

impl DispatchFailure {
    /// Per-target failures: `(target id, classified cause)` pairs.
    pub fn failures(&self) -> &[(String, Failure)] {
        &self.failures
    }

    pub fn failed_targets(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|(id, _)| id.as_str())
    }
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dispatch failed for {} target(s): ", self.failures.len())?;
        for (i, (id, cause)) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{id}: {cause}")?;
        }
        Ok(())
    }
}

impl StdError for DispatchFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.failures
            .first()
            .map(|(_, cause)| cause as &(dyn StdError + 'static))
    }
}

/// Delivers one record to every registered target.
///
/// Targets are attempted in registration order, or with bounded concurrency
/// when `with_max_concurrent` raises the limit; either way all outcomes are
/// joined before returning and no partial result is ever observed by the
/// caller. Dispatch listeners fire exactly once per target, around that
/// target's send. The dispatcher keeps no memory of prior dispatches.
pub struct FanoutDispatcher<P> {
    targets: Vec<Arc<dyn DispatchTarget<P>>>,
    listeners: Arc<ListenerGroup<dyn DispatchListener<P>>>,
    max_concurrent: usize,
}

impl<P> FanoutDispatcher<P> {
    pub fn new(targets: Vec<Arc<dyn DispatchTarget<P>>>) -> Self {
        Self {
            targets,
            listeners: Arc::new(ListenerGroup::new()),
            max_concurrent: 1,
        }
    }

    /// Attach the dispatch listener group (configure-then-run: set up
    /// before the first dispatch).
    pub fn with_listeners(mut self, listeners: ListenerGroup<dyn DispatchListener<P>>) -> Self {
        self.listeners = Arc::new(listeners);
        self
    }

    /// Allow up to `n` targets to be sent to concurrently. 1 (the default)
    /// keeps delivery sequential in registration order.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

impl<P: Send + Sync + 'static> FanoutDispatcher<P> {
    /// Send `record` to every target. Ownership of the record moves to the
    /// dispatcher; the payload is forwarded to targets unmodified.
    ///
    /// Returns `Ok(())` only when every target accepted the record;
    /// otherwise a `DispatchFailure` naming each failing target, in target
    /// order.
    pub async fn dispatch(&self, record: Record<P>) -> Result<(), DispatchFailure> {
        debug!(
            sequence = record.header.sequence,
            targets = self.targets.len(),
            "dispatching record"
        );
        let failures = if self.max_concurrent > 1 && self.targets.len() > 1 {
            self.dispatch_concurrent(Arc::new(record)).await
        } else {
            self.dispatch_sequential(&record).await
        };
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchFailure { failures })
        }
    }

    async fn dispatch_sequential(&self, record: &Record<P>) -> Vec<(String, Failure)> {
        let mut failures = Vec::new();
        for target in &self.targets {
            if let Err(cause) = send_one(target.as_ref(), &self.listeners, record).await {
                failures.push((target.id().to_string(), cause));
            }
        }
        failures
    }

    /// Bounded-concurrency delivery. Hook ordering stays scoped per target;
    /// outcomes are joined and reported in target registration order.
    async fn dispatch_concurrent(&self, record: Arc<Record<P>>) -> Vec<(String, Failure)> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut join_set = JoinSet::new();
        for (index, target) in self.targets.iter().enumerate() {
            let target = Arc::clone(target);
            let record = Arc::clone(&record);
            let listeners = Arc::clone(&self.listeners);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                // Never closed, so acquire cannot fail.
                let _permit = semaphore.acquire_owned().await.unwrap();
                let outcome = send_one(target.as_ref(), &listeners, &record).await;
                (index, target.id().to_string(), outcome)
            });
        }

        let mut failures: Vec<(usize, String, Failure)> = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((_, _, Ok(()))) => {}
                Ok((index, id, Err(cause))) => failures.push((index, id, cause)),
                Err(e) => {
                    warn!(error = %e, "dispatch worker task failed");
                    failures.push((
                        usize::MAX,
                        "<unknown>".to_string(),
                        Failure::msg(FailureKind::Fatal, format!("dispatch task join: {e}")),
                    ));
                }
            }
        }
        failures.sort_by_key(|(index, _, _)| *index);
        failures
            .into_iter()
            .map(|(_, id, cause)| (id, cause))
            .collect()
    }
}

/// One target's send, bracketed by the dispatch listener hooks. Listener
/// failures are logged; the send outcome is what gets reported.
async fn send_one<P: 'static>(
    target: &dyn DispatchTarget<P>,
    listeners: &ListenerGroup<dyn DispatchListener<P>>,
    record: &Record<P>,
) -> Result<(), Failure> {
    let event = DispatchEvent {
        record,
        target_id: target.id(),
    };
    if let Err(e) = listeners.before_send(&event) {
        warn!(target = event.target_id, error = %e, "dispatch listener failed in before_send");
    }
    match target.send(record).await {
        Ok(()) => {
            if let Err(e) = listeners.after_send(&event) {
                warn!(target = event.target_id, error = %e, "dispatch listener failed in after_send");
            }
            Ok(())
        }
        Err(cause) => {
            debug!(target = event.target_id, error = %cause, "target rejected record");
            let _ = listeners.on_send_failure(&event, &cause);
            Err(cause)
        }
    }
}
