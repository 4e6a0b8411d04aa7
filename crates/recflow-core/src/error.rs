//! Shared failure taxonomy.
//!
//! Connector errors (database drivers, queue clients, file readers) are
//! classified exactly once, at the boundary where they enter the core, into
//! a closed set of kinds the retry policy can reason about. The rest of the
//! core never inspects technology-specific error types.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed cause carried by a classified failure.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// High-level classification of a connector failure for retry purposes.
///
/// Assigned once at the boundary; callers map driver errors, status codes,
/// or IO failures into these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Operation timed out (connect/read/send).
    Timeout,
    /// Source or sink temporarily unavailable (connection refused, reset).
    Unavailable,
    /// Peer asked us to slow down.
    Throttled,
    /// Data arrived but could not be used (truncated, bad framing).
    Corrupted,
    /// Permanent error; another attempt cannot help.
    Fatal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Unavailable => "unavailable",
            FailureKind::Throttled => "throttled",
            FailureKind::Corrupted => "corrupted",
            FailureKind::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// One classified failure from an external capability (a read attempt or a
/// target send). Carries the original cause for diagnosis.
#[derive(Debug, Error)]
#[error("{kind}: {cause}")]
pub struct Failure {
    kind: FailureKind,
    #[source]
    cause: BoxError,
}

impl Failure {
    /// Classify `cause` as `kind`.
    pub fn new(kind: FailureKind, cause: impl Into<BoxError>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }

    /// Classified failure from a plain message, for connectors whose native
    /// error has already been rendered to text.
    pub fn msg(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            cause: message.into().into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn cause(&self) -> &(dyn StdError + Send + Sync) {
        self.cause.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_and_cause() {
        let f = Failure::msg(FailureKind::Timeout, "read timed out");
        assert_eq!(f.to_string(), "timeout: read timed out");
        assert_eq!(f.kind(), FailureKind::Timeout);
    }

    #[test]
    fn source_chain_reaches_original_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let f = Failure::new(FailureKind::Unavailable, io);
        let source = std::error::Error::source(&f).expect("source");
        assert!(source.to_string().contains("reset by peer"));
    }
}
