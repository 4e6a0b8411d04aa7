//! Record and header types flowing from readers to dispatch targets.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Metadata attached to every record by the reading side.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Position in the source, starting at 1 and strictly increasing.
    pub sequence: u64,
    /// Name of the source the record came from.
    pub source: String,
    /// When the record was read.
    pub created_at: SystemTime,
}

impl Header {
    pub fn new(sequence: u64, source: impl Into<String>) -> Self {
        Self {
            sequence,
            source: source.into(),
            created_at: SystemTime::now(),
        }
    }
}

/// One unit of data flowing through the pipeline. The payload is opaque to
/// the core: ownership moves to the dispatcher on hand-off, which forwards
/// it to targets without mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<P> {
    pub header: Header,
    pub payload: P,
}

impl<P> Record<P> {
    pub fn new(header: Header, payload: P) -> Self {
        Self { header, payload }
    }
}

/// Hands out record sequence numbers: 1, 2, 3, ...
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    issued: AtomicU64,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next sequence number; the first call returns 1.
    pub fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }
}
