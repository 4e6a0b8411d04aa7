//! Per-batch events: hooks fired around the dispatch of one batch.
//!
//! Batch hooks observe the batch's headers rather than the records
//! themselves: payload ownership has already moved to the dispatcher by
//! the time after-hooks fire.

use std::error::Error as StdError;

use crate::record::Header;

use super::{ListenerError, ListenerGroup};

/// Context handed to batch listeners: headers of the records in the batch.
#[derive(Debug)]
pub struct BatchEvent<'a> {
    pub headers: &'a [Header],
}

/// Observer of per-batch lifecycle events.
pub trait BatchListener: Send + Sync {
    fn before_batch(&self, event: &BatchEvent<'_>) -> Result<(), ListenerError> {
        let _ = event;
        Ok(())
    }

    fn after_batch(&self, event: &BatchEvent<'_>) -> Result<(), ListenerError> {
        let _ = event;
        Ok(())
    }

    /// `cause` is the failure that aborted the batch; it is surfaced to the
    /// caller unchanged regardless of what listeners do here.
    fn on_batch_failure(
        &self,
        event: &BatchEvent<'_>,
        cause: &(dyn StdError + 'static),
    ) -> Result<(), ListenerError> {
        let _ = (event, cause);
        Ok(())
    }
}

/// A group of batch listeners is itself a batch listener: before in
/// registration order, after and failure in reverse.
impl BatchListener for ListenerGroup<dyn BatchListener> {
    fn before_batch(&self, event: &BatchEvent<'_>) -> Result<(), ListenerError> {
        self.notify_forward(|l| l.before_batch(event))
    }

    fn after_batch(&self, event: &BatchEvent<'_>) -> Result<(), ListenerError> {
        self.notify_reverse(|l| l.after_batch(event))
    }

    fn on_batch_failure(
        &self,
        event: &BatchEvent<'_>,
        cause: &(dyn StdError + 'static),
    ) -> Result<(), ListenerError> {
        self.notify_reverse_logged(|l| l.on_batch_failure(event, cause));
        Ok(())
    }
}
