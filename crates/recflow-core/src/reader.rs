//! Record reading capability and the retrying decorator.
//!
//! `RecordReader` is the contract technology-specific sources implement;
//! `RetryableReader` wraps one so each `read_next` runs through a single
//! `RetryExecutor` bound at construction. `open` and `close` are one-shot
//! bracketing operations and pass straight through.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Failure;
use crate::record::Record;
use crate::retry::{NoopHooks, RetryError, RetryExecutor, RetryHooks, RetryPolicy};

/// Capability exposed by external record sources.
///
/// `read_next` returns `Ok(None)` at end of data; that is a success, not a
/// failure. All failures must already be classified into the core taxonomy.
#[async_trait]
pub trait RecordReader: Send {
    type Payload: Send;

    async fn open(&mut self) -> Result<(), Failure>;

    async fn read_next(&mut self) -> Result<Option<Record<Self::Payload>>, Failure>;

    async fn close(&mut self) -> Result<(), Failure>;
}

/// Decorator that retries each `read_next` call of the wrapped reader.
///
/// The executor is bound once at construction, not re-created per call, so
/// its hooks keep their context across attempts and across records. End of
/// data (`Ok(None)`) is returned as-is and never retried.
pub struct RetryableReader<R, H = NoopHooks> {
    // Mutex so the retried closure can re-enter the reader per attempt;
    // attempts are sequential, the lock is never contended.
    inner: Mutex<R>,
    executor: RetryExecutor<H>,
}

impl<R> RetryableReader<R> {
    /// Wrap `inner` with a fresh executor under `policy` and no hooks.
    pub fn new(inner: R, policy: RetryPolicy) -> Self {
        Self::with_executor(inner, RetryExecutor::new(policy))
    }
}

impl<R, H> RetryableReader<R, H> {
    /// Wrap `inner` with a caller-built executor (custom hooks, abort token).
    pub fn with_executor(inner: R, executor: RetryExecutor<H>) -> Self {
        Self {
            inner: Mutex::new(inner),
            executor,
        }
    }

    /// Unwrap, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: RecordReader, H: RetryHooks> RetryableReader<R, H> {
    /// Pass-through: opening the source is performed once per run and is
    /// not retried.
    pub async fn open(&mut self) -> Result<(), Failure> {
        self.inner.get_mut().open().await
    }

    /// Read the next record through the retry executor.
    pub async fn read_next(&mut self) -> Result<Option<Record<R::Payload>>, RetryError> {
        let inner = &self.inner;
        self.executor
            .execute(|| async move { inner.lock().await.read_next().await })
            .await
    }

    /// Pass-through: closing the source is not retried.
    pub async fn close(&mut self) -> Result<(), Failure> {
        self.inner.get_mut().close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::record::Header;
    use crate::retry::RetryPolicy;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Reader that replays a scripted sequence of read outcomes.
    struct ScriptedReader {
        steps: VecDeque<Result<Option<Record<String>>, Failure>>,
        opened: u32,
        closed: u32,
        reads: u32,
    }

    impl ScriptedReader {
        fn new(steps: Vec<Result<Option<Record<String>>, Failure>>) -> Self {
            Self {
                steps: steps.into(),
                opened: 0,
                closed: 0,
                reads: 0,
            }
        }
    }

    #[async_trait]
    impl RecordReader for ScriptedReader {
        type Payload = String;

        async fn open(&mut self) -> Result<(), Failure> {
            self.opened += 1;
            Ok(())
        }

        async fn read_next(&mut self) -> Result<Option<Record<String>>, Failure> {
            self.reads += 1;
            self.steps.pop_front().unwrap_or(Ok(None))
        }

        async fn close(&mut self) -> Result<(), Failure> {
            self.closed += 1;
            Ok(())
        }
    }

    fn record(sequence: u64, payload: &str) -> Record<String> {
        Record::new(Header::new(sequence, "scripted"), payload.to_string())
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn transient_read_failure_is_retried() {
        let reader = ScriptedReader::new(vec![
            Err(Failure::msg(FailureKind::Unavailable, "source flapping")),
            Ok(Some(record(1, "a"))),
        ]);
        let mut reader = RetryableReader::new(reader, policy());

        reader.open().await.unwrap();
        let got = reader.read_next().await.unwrap().unwrap();
        assert_eq!(got.payload, "a");
        reader.close().await.unwrap();

        let inner = reader.into_inner();
        assert_eq!(inner.reads, 2);
        assert_eq!(inner.opened, 1);
        assert_eq!(inner.closed, 1);
    }

    #[tokio::test]
    async fn end_of_data_is_returned_unchanged_and_never_retried() {
        let reader = ScriptedReader::new(vec![Ok(None)]);
        let mut reader = RetryableReader::new(reader, policy());

        assert!(reader.read_next().await.unwrap().is_none());
        assert_eq!(reader.into_inner().reads, 1);
    }

    #[tokio::test]
    async fn persistent_failure_surfaces_retry_exhausted() {
        let reader = ScriptedReader::new(vec![
            Err(Failure::msg(FailureKind::Timeout, "down")),
            Err(Failure::msg(FailureKind::Timeout, "down")),
            Err(Failure::msg(FailureKind::Timeout, "down")),
        ]);
        let mut reader = RetryableReader::new(reader, policy());

        let err = reader.read_next().await.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), 3);
        assert_eq!(reader.into_inner().reads, 3);
    }

    #[tokio::test]
    async fn non_retryable_read_failure_short_circuits() {
        let reader = ScriptedReader::new(vec![
            Err(Failure::msg(FailureKind::Corrupted, "bad frame")),
            Ok(Some(record(1, "never reached"))),
        ]);
        let executor = RetryExecutor::new(
            policy().retry_on([FailureKind::Timeout, FailureKind::Unavailable]),
        );
        let mut reader = RetryableReader::with_executor(reader, executor);

        let err = reader.read_next().await.unwrap_err();
        assert!(err.is_non_retryable());
        assert_eq!(reader.into_inner().reads, 1);
    }
}
