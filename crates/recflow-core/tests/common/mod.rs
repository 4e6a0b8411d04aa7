//! In-memory doubles shared by the integration tests: a scripted record
//! source, a collecting dispatch target, and recording listeners.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use recflow_core::error::Failure;
use recflow_core::listener::{
    BatchEvent, BatchListener, DispatchEvent, DispatchListener, ListenerError,
};
use recflow_core::reader::RecordReader;
use recflow_core::record::{Header, Record};

/// Counters observable after the pipeline has consumed the reader.
#[derive(Debug, Default)]
pub struct ReaderStats {
    pub opened: AtomicU32,
    pub closed: AtomicU32,
    pub reads: AtomicU32,
}

impl ReaderStats {
    pub fn opened(&self) -> u32 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> u32 {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

/// Reader that replays a scripted sequence of outcomes, then reports end of
/// data forever.
pub struct ScriptedReader {
    steps: VecDeque<Result<Option<Record<String>>, Failure>>,
    stats: Arc<ReaderStats>,
}

impl ScriptedReader {
    pub fn new(
        steps: Vec<Result<Option<Record<String>>, Failure>>,
    ) -> (Self, Arc<ReaderStats>) {
        let stats = Arc::new(ReaderStats::default());
        (
            Self {
                steps: steps.into(),
                stats: Arc::clone(&stats),
            },
            stats,
        )
    }
}

#[async_trait]
impl RecordReader for ScriptedReader {
    type Payload = String;

    async fn open(&mut self) -> Result<(), Failure> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read_next(&mut self) -> Result<Option<Record<String>>, Failure> {
        self.stats.reads.fetch_add(1, Ordering::SeqCst);
        self.steps.pop_front().unwrap_or(Ok(None))
    }

    async fn close(&mut self) -> Result<(), Failure> {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn record(sequence: u64, payload: &str) -> Record<String> {
    Record::new(Header::new(sequence, "scripted"), payload.to_string())
}

/// Target that collects accepted payloads and optionally rejects a payload
/// by value.
pub struct CollectingTarget {
    id: String,
    reject: Option<String>,
    accepted: Mutex<Vec<String>>,
}

impl CollectingTarget {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            reject: None,
            accepted: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting(id: &str, payload: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            reject: Some(payload.to_string()),
            accepted: Mutex::new(Vec::new()),
        })
    }

    pub fn accepted(&self) -> Vec<String> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait]
impl recflow_core::dispatch::DispatchTarget<String> for CollectingTarget {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, record: &Record<String>) -> Result<(), Failure> {
        if self.reject.as_deref() == Some(record.payload.as_str()) {
            return Err(Failure::msg(
                recflow_core::error::FailureKind::Unavailable,
                format!("{} rejected {}", self.id, record.payload),
            ));
        }
        self.accepted.lock().unwrap().push(record.payload.clone());
        Ok(())
    }
}

/// Batch listener that appends tagged phase markers to a shared log.
pub struct RecordingBatchListener {
    tag: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingBatchListener {
    pub fn new(tag: &'static str, log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { tag, log })
    }
}

impl BatchListener for RecordingBatchListener {
    fn before_batch(&self, event: &BatchEvent<'_>) -> Result<(), ListenerError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:before[{}]", self.tag, event.headers.len()));
        Ok(())
    }

    fn after_batch(&self, event: &BatchEvent<'_>) -> Result<(), ListenerError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:after[{}]", self.tag, event.headers.len()));
        Ok(())
    }

    fn on_batch_failure(
        &self,
        event: &BatchEvent<'_>,
        _cause: &(dyn std::error::Error + 'static),
    ) -> Result<(), ListenerError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:failure[{}]", self.tag, event.headers.len()));
        Ok(())
    }
}

/// Dispatch listener that appends `phase:target` markers to a shared log.
pub struct RecordingDispatchListener {
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingDispatchListener {
    pub fn new(log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { log })
    }
}

impl DispatchListener<String> for RecordingDispatchListener {
    fn before_send(&self, event: &DispatchEvent<'_, String>) -> Result<(), ListenerError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("before:{}", event.target_id));
        Ok(())
    }

    fn after_send(&self, event: &DispatchEvent<'_, String>) -> Result<(), ListenerError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("after:{}", event.target_id));
        Ok(())
    }

    fn on_send_failure(
        &self,
        event: &DispatchEvent<'_, String>,
        _cause: &Failure,
    ) -> Result<(), ListenerError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("failure:{}", event.target_id));
        Ok(())
    }
}
