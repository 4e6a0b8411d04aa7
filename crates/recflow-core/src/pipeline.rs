//! Pipeline driver: reads records in batches through a retrying reader and
//! fans each one out to the dispatch targets.
//!
//! The driver owns the run loop only; all failure-handling policy lives in
//! the retry executor and the dispatcher. The reader is closed on every
//! exit path, success or failure.

use thiserror::Error;
use tracing::{info, warn};

use crate::dispatch::{DispatchFailure, FanoutDispatcher};
use crate::error::Failure;
use crate::listener::{BatchEvent, BatchListener, ListenerGroup};
use crate::reader::{RecordReader, RetryableReader};
use crate::record::Header;
use crate::retry::{NoopHooks, RetryError, RetryHooks};

/// Error surfaced by a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("opening reader: {0}")]
    Open(#[source] Failure),

    #[error("reading record: {0}")]
    Read(#[source] RetryError),

    #[error("dispatching record {sequence}: {cause}")]
    Dispatch {
        sequence: u64,
        #[source]
        cause: DispatchFailure,
    },

    #[error("closing reader: {0}")]
    Close(#[source] Failure),
}

/// Counters reported after a pipeline run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub records_read: u64,
    pub records_dispatched: u64,
    pub batches: u64,
}

/// One pipeline instance: a retrying reader, a fan-out dispatcher, and the
/// batch listeners fired around each batch.
pub struct Pipeline<R: RecordReader, H = NoopHooks> {
    reader: RetryableReader<R, H>,
    dispatcher: FanoutDispatcher<R::Payload>,
    batch_listeners: ListenerGroup<dyn BatchListener>,
    batch_size: usize,
}

impl<R, H> Pipeline<R, H>
where
    R: RecordReader,
    R::Payload: Send + Sync + 'static,
    H: RetryHooks,
{
    pub fn new(reader: RetryableReader<R, H>, dispatcher: FanoutDispatcher<R::Payload>) -> Self {
        Self {
            reader,
            dispatcher,
            batch_listeners: ListenerGroup::new(),
            batch_size: 100,
        }
    }

    /// Records per batch handed to batch listeners. Clamped to at least 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_batch_listeners(mut self, listeners: ListenerGroup<dyn BatchListener>) -> Self {
        self.batch_listeners = listeners;
        self
    }

    /// Run the pipeline to end of data. The reader is closed whether the
    /// loop succeeds or fails; a close failure only surfaces when the loop
    /// itself succeeded.
    pub async fn run(&mut self) -> Result<RunReport, PipelineError> {
        self.reader.open().await.map_err(PipelineError::Open)?;
        let outcome = self.run_loop().await;
        let closed = self.reader.close().await;
        let report = outcome?;
        closed.map_err(PipelineError::Close)?;
        info!(
            records = report.records_dispatched,
            batches = report.batches,
            "pipeline run complete"
        );
        Ok(report)
    }

    async fn run_loop(&mut self) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();
        loop {
            let mut batch = Vec::with_capacity(self.batch_size);
            let mut end_of_data = false;
            while batch.len() < self.batch_size {
                match self.reader.read_next().await.map_err(PipelineError::Read)? {
                    Some(record) => {
                        report.records_read += 1;
                        batch.push(record);
                    }
                    None => {
                        end_of_data = true;
                        break;
                    }
                }
            }

            if !batch.is_empty() {
                report.batches += 1;
                let headers: Vec<Header> = batch.iter().map(|r| r.header.clone()).collect();
                let event = BatchEvent { headers: &headers };

                if let Err(e) = self.batch_listeners.before_batch(&event) {
                    warn!(error = %e, "batch listener failed in before_batch");
                }
                for record in batch {
                    let sequence = record.header.sequence;
                    if let Err(cause) = self.dispatcher.dispatch(record).await {
                        let _ = self.batch_listeners.on_batch_failure(&event, &cause);
                        return Err(PipelineError::Dispatch { sequence, cause });
                    }
                    report.records_dispatched += 1;
                }
                if let Err(e) = self.batch_listeners.after_batch(&event) {
                    warn!(error = %e, "batch listener failed in after_batch");
                }
            }

            if end_of_data {
                return Ok(report);
            }
        }
    }
}
