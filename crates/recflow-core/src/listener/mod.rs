//! Ordered listener groups for pipeline lifecycle events.
//!
//! Before-hooks fire in registration order; after- and failure-hooks fire
//! in reverse registration order, so the last-registered listener observes
//! completion first and outer listeners wrap inner ones the way nested
//! scopes would. Delivery always completes: one misbehaving listener never
//! prevents its peers from observing a phase.

mod batch;
mod dispatch;

pub use batch::{BatchEvent, BatchListener};
pub use dispatch::{DispatchEvent, DispatchListener};

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

/// Failure raised by a listener. Collected by the group and surfaced after
/// full delivery; never allowed to mask the primary outcome being reported.
#[derive(Debug, Error)]
#[error("listener failure: {message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Ordered set of listeners invoked as one unit.
///
/// Registration happens during pipeline setup; the group is append-only
/// before execution and read-only during, so no locking is needed.
pub struct ListenerGroup<L: ?Sized> {
    listeners: Vec<Arc<L>>,
}

impl<L: ?Sized> Default for ListenerGroup<L> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<L: ?Sized> ListenerGroup<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; invocation order follows registration order.
    pub fn register(&mut self, listener: Arc<L>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invoke `f` on every listener in registration order. Delivery always
    /// completes; the first listener failure, if any, is returned after the
    /// full traversal.
    pub fn notify_forward<F>(&self, f: F) -> Result<(), ListenerError>
    where
        F: FnMut(&L) -> Result<(), ListenerError>,
    {
        Self::deliver(self.listeners.iter(), f)
    }

    /// Same collection rule as `notify_forward`, in reverse registration
    /// order.
    pub fn notify_reverse<F>(&self, f: F) -> Result<(), ListenerError>
    where
        F: FnMut(&L) -> Result<(), ListenerError>,
    {
        Self::deliver(self.listeners.iter().rev(), f)
    }

    /// Reverse-order delivery for failure notifications: listener errors
    /// are logged and swallowed so they cannot mask the triggering cause.
    pub fn notify_reverse_logged<F>(&self, mut f: F)
    where
        F: FnMut(&L) -> Result<(), ListenerError>,
    {
        for listener in self.listeners.iter().rev() {
            if let Err(e) = f(listener) {
                warn!(error = %e, "listener failed during failure notification");
            }
        }
    }

    fn deliver<'a, I, F>(listeners: I, mut f: F) -> Result<(), ListenerError>
    where
        I: Iterator<Item = &'a Arc<L>>,
        L: 'a,
        F: FnMut(&L) -> Result<(), ListenerError>,
    {
        let mut first: Option<ListenerError> = None;
        for listener in listeners {
            if let Err(e) = f(listener) {
                warn!(error = %e, "listener failed during notification");
                first.get_or_insert(e);
            }
        }
        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
