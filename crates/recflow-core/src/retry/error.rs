//! Terminal outcomes of a retry run.

use thiserror::Error;

use crate::error::Failure;

/// Error returned when a retry run does not produce a value.
///
/// Callers see exactly one of these (or the success value); never a raw
/// unclassified failure from the wrapped operation.
#[derive(Debug, Error)]
pub enum RetryError {
    /// The failure kind was outside the policy's retryable set; the run
    /// stopped without spending the remaining attempt budget.
    #[error("non-retryable failure on attempt {attempt}: {cause}")]
    NonRetryable {
        attempt: u32,
        #[source]
        cause: Failure,
    },

    /// The attempt budget ran out while failures stayed retryable in kind.
    #[error("retry exhausted after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Failure,
    },

    /// The caller abandoned the run at a wait boundary. The in-flight
    /// attempt had already settled; `last` is its failure.
    #[error("retry aborted after {attempts} attempt(s)")]
    Aborted { attempts: u32, last: Option<Failure> },
}

impl RetryError {
    /// Number of attempts made before the run ended.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::NonRetryable { attempt, .. } => *attempt,
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Aborted { attempts, .. } => *attempts,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    pub fn is_non_retryable(&self) -> bool {
        matches!(self, RetryError::NonRetryable { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, RetryError::Aborted { .. })
    }

    /// The last classified failure observed, when one exists.
    pub fn last_failure(&self) -> Option<&Failure> {
        match self {
            RetryError::NonRetryable { cause, .. } => Some(cause),
            RetryError::Exhausted { last, .. } => Some(last),
            RetryError::Aborted { last, .. } => last.as_ref(),
        }
    }
}
