//! The execution core: a bounded worker pool that performs HTTP POST calls
//! against a job's registered endpoint, retries transient failures with
//! exponential backoff, and durably records the terminal outcome of every
//! firing exactly once.
//!
//! Receives firings from the dispatch core by implementing
//! [`dispatch::FiringSink`]; never blocks the dispatch loop beyond a bounded
//! channel send.

mod error;
mod pool;

pub use error::AttemptError;
pub use pool::{ExecutionConfig, ExecutionCore};
