use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A transient, in-heap record of one job's next fire instant (spec §3
/// `ScheduledEntry`). Created during reconciliation or immediately after a
/// firing is dispatched; destroyed when popped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEntry {
    pub next_run: DateTime<Utc>,
    pub job_id: Uuid,
    pub schedule: String,
    pub api_url: String,
}

impl Ord for ScheduledEntry {
    /// Reversed so [`std::collections::BinaryHeap`], which is a max-heap,
    /// pops the entry with the *earliest* `next_run` first. Ties are broken
    /// by `job_id` so the ordering is total regardless of instant
    /// collisions.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .next_run
            .cmp(&self.next_run)
            .then_with(|| self.job_id.cmp(&other.job_id))
    }
}

impl PartialOrd for ScheduledEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    fn entry(secs: i64, job_id: Uuid) -> ScheduledEntry {
        ScheduledEntry {
            next_run: DateTime::from_timestamp(secs, 0).unwrap(),
            job_id,
            schedule: "* * * * * *".to_string(),
            api_url: "http://example.com".to_string(),
        }
    }

    #[test]
    fn heap_pops_earliest_next_run_first() {
        let mut heap = BinaryHeap::new();
        heap.push(entry(300, Uuid::new_v4()));
        heap.push(entry(100, Uuid::new_v4()));
        heap.push(entry(200, Uuid::new_v4()));

        assert_eq!(heap.pop().unwrap().next_run.timestamp(), 100);
        assert_eq!(heap.pop().unwrap().next_run.timestamp(), 200);
        assert_eq!(heap.pop().unwrap().next_run.timestamp(), 300);
    }

    #[test]
    fn ties_are_broken_by_job_id() {
        let low_id = Uuid::nil();
        let high_id = Uuid::max();
        let mut heap = BinaryHeap::new();
        heap.push(entry(100, high_id));
        heap.push(entry(100, low_id));

        assert_eq!(heap.pop().unwrap().job_id, low_id);
        assert_eq!(heap.pop().unwrap().job_id, high_id);
    }
}
