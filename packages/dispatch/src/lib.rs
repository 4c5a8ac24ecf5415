//! The dispatch core: an in-memory priority queue of upcoming job firings,
//! periodically reconciled against a durable catalog, that hands each due
//! firing off to an execution core through a non-blocking [`FiringSink`].
//!
//! Owns no HTTP client and no retry logic; those live in the execution core
//! on the other side of `FiringSink`.

mod core;
mod entry;
mod error;
mod sink;

pub use crate::core::{DispatchCore, State};
pub use entry::ScheduledEntry;
pub use error::{DispatchError, OverCapacity};
pub use sink::{Firing, FiringSink};
