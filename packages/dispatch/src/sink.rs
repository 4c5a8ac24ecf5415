use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::OverCapacity;

/// An immutable descriptor handed from the dispatch core to the execution
/// core. `execution_id` and `actual_start_time` are deliberately absent —
/// the execution core assigns them at dequeue (spec §4.4) so that drift
/// reflects when a worker actually began, not when the dispatcher enqueued
/// the firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing {
    pub job_id: Uuid,
    pub api_url: String,
    pub scheduled_time: DateTime<Utc>,
}

/// The dispatch core's only dependency on the execution core: a place to
/// hand off due firings. `submit` must never block the dispatch loop on
/// worker availability beyond a bounded queue (spec §4.4); implementations
/// return [`OverCapacity`] instead of blocking or panicking when that queue
/// is full.
pub trait FiringSink: Send + Sync {
    fn submit(&self, firing: Firing) -> Result<(), OverCapacity>;
}
