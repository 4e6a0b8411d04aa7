//! Per-record dispatch events: hooks fired around each target's send.

use crate::error::Failure;
use crate::record::Record;

use super::{ListenerError, ListenerGroup};

/// Context handed to dispatch listeners: the record being sent and the
/// target it is being sent to.
#[derive(Debug)]
pub struct DispatchEvent<'a, P> {
    pub record: &'a Record<P>,
    pub target_id: &'a str,
}

/// Observer of per-record dispatch events. Hooks fire exactly once per
/// target per dispatch, around that target's send.
pub trait DispatchListener<P>: Send + Sync {
    fn before_send(&self, event: &DispatchEvent<'_, P>) -> Result<(), ListenerError> {
        let _ = event;
        Ok(())
    }

    fn after_send(&self, event: &DispatchEvent<'_, P>) -> Result<(), ListenerError> {
        let _ = event;
        Ok(())
    }

    /// `cause` is the target's send failure; it is reported to the caller
    /// unchanged regardless of what listeners do here.
    fn on_send_failure(
        &self,
        event: &DispatchEvent<'_, P>,
        cause: &Failure,
    ) -> Result<(), ListenerError> {
        let _ = (event, cause);
        Ok(())
    }
}

/// A group of dispatch listeners is itself a dispatch listener: before in
/// registration order, after and failure in reverse.
impl<P: 'static> DispatchListener<P> for ListenerGroup<dyn DispatchListener<P>> {
    fn before_send(&self, event: &DispatchEvent<'_, P>) -> Result<(), ListenerError> {
        self.notify_forward(|l| l.before_send(event))
    }

    fn after_send(&self, event: &DispatchEvent<'_, P>) -> Result<(), ListenerError> {
        self.notify_reverse(|l| l.after_send(event))
    }

    fn on_send_failure(
        &self,
        event: &DispatchEvent<'_, P>,
        cause: &Failure,
    ) -> Result<(), ListenerError> {
        self.notify_reverse_logged(|l| l.on_send_failure(event, cause));
        Ok(())
    }
}
