//! Retry engine: policy, executor, lifecycle hooks, terminal errors.
//!
//! Encapsulates attempt budgeting and failure-kind classification so the
//! reading and dispatch layers share one retry behavior. The inter-attempt
//! delay is the only suspension point and goes through `tokio::time::sleep`.

mod error;
mod executor;
mod hooks;
mod policy;

pub use error::RetryError;
pub use executor::{run_with_retry, AbortToken, RetryExecutor};
pub use hooks::{NoopHooks, RetryHooks, TracingHooks};
pub use policy::{RetryDecision, RetryPolicy};
