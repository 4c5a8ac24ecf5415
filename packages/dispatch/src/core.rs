use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use catalog::Catalog;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::Instant as TokioInstant;
use tokio_util::sync::CancellationToken;

use crate::entry::ScheduledEntry;
use crate::error::DispatchError;
use crate::sink::{Firing, FiringSink};

/// Maximum sleep bound within the dispatch loop (spec §4.3, GLOSSARY "Tick").
const TICK: StdDuration = StdDuration::from_secs(1);

/// Dispatch core lifecycle (spec §4.3 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Stopped,
    Running,
    Stopping,
}

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;

/// A single-threaded loop that owns an in-memory priority queue keyed by
/// next fire instant, periodically reconciled against a durable catalog.
///
/// The heap is protected by a single lock covering clear/push/pop/peek
/// (spec §5); `reconcile`/`refresh_schedule` and the dispatch loop's own
/// pop-then-push are all serialized through it, so calling
/// `refresh_schedule` concurrently with `run` is safe.
pub struct DispatchCore {
    catalog: Arc<dyn Catalog>,
    sink: Arc<dyn FiringSink>,
    heap: Mutex<BinaryHeap<ScheduledEntry>>,
    refresh_interval: StdDuration,
    state: AtomicU8,
    shutdown: CancellationToken,
}

impl DispatchCore {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        sink: Arc<dyn FiringSink>,
        refresh_interval: StdDuration,
    ) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            sink,
            heap: Mutex::new(BinaryHeap::new()),
            refresh_interval,
            state: AtomicU8::new(STOPPED),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn state(&self) -> State {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => State::Running,
            STOPPING => State::Stopping,
            _ => State::Stopped,
        }
    }

    /// How many jobs are currently scheduled in the heap. Exposed for tests
    /// and for an operational status endpoint.
    pub async fn scheduled_count(&self) -> usize {
        self.heap.lock().await.len()
    }

    /// Rebuild the heap from the catalog's current active-job set. Jobs with
    /// a malformed schedule are logged and skipped; reconciliation still
    /// succeeds for every other job (spec §4.3).
    pub async fn reconcile(&self) -> Result<(), DispatchError> {
        let now = Utc::now();
        let jobs = self.catalog.list_active().await?;

        let mut entries = Vec::with_capacity(jobs.len());
        for job in jobs {
            match cron::next(&job.schedule, now) {
                Ok(next_run) => entries.push(ScheduledEntry {
                    next_run,
                    job_id: job.job_id,
                    schedule: job.schedule,
                    api_url: job.api_url,
                }),
                Err(error) => {
                    tracing::warn!(job_id = %job.job_id, %error, "skipping job with malformed schedule during reconciliation");
                }
            }
        }

        let mut heap = self.heap.lock().await;
        heap.clear();
        heap.extend(entries);
        Ok(())
    }

    /// An idempotent request for an immediate reconciliation. Safe to call
    /// concurrently with the dispatch loop; serialized by the heap lock.
    pub async fn refresh_schedule(&self) -> Result<(), DispatchError> {
        self.reconcile().await
    }

    /// Signal the loop to stop. The loop observes this within one tick and
    /// transitions `Running -> Stopping -> Stopped`. Does not wait for
    /// in-flight firings in the execution core; callers own that sequencing.
    pub fn stop(&self) {
        self.state.store(STOPPING, Ordering::SeqCst);
        self.shutdown.cancel();
    }

    /// Run the dispatch loop until [`DispatchCore::stop`] is called.
    /// Transient errors (a reconciliation failure, a schedule that no
    /// longer parses) are logged and the loop resumes after one tick; only
    /// `stop()` terminates it (spec §4.3, §7).
    pub async fn run(self: Arc<Self>) {
        self.state.store(RUNNING, Ordering::SeqCst);

        if let Err(error) = self.reconcile().await {
            tracing::error!(%error, "initial reconciliation failed");
        }
        let mut last_reconcile = TokioInstant::now();

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            if last_reconcile.elapsed() >= self.refresh_interval {
                if let Err(error) = self.reconcile().await {
                    tracing::error!(%error, "periodic reconciliation failed");
                }
                last_reconcile = TokioInstant::now();
            }

            let now = Utc::now();
            let earliest = self.heap.lock().await.peek().cloned();

            let Some(entry) = earliest else {
                tokio::time::sleep(TICK).await;
                continue;
            };

            if entry.next_run > now {
                let wait = (entry.next_run - now).to_std().unwrap_or(TICK).min(TICK);
                tokio::time::sleep(wait).await;
                continue;
            }

            let popped = self.heap.lock().await.pop();
            let Some(entry) = popped else {
                continue;
            };

            if let Err(_over_capacity) = self.sink.submit(Firing {
                job_id: entry.job_id,
                api_url: entry.api_url.clone(),
                scheduled_time: entry.next_run,
            }) {
                tracing::error!(job_id = %entry.job_id, "execution queue full, firing dropped");
            }

            match cron::next(&entry.schedule, now) {
                Ok(new_next) => {
                    self.heap.lock().await.push(ScheduledEntry {
                        next_run: new_next,
                        ..entry
                    });
                }
                Err(error) => {
                    tracing::error!(job_id = %entry.job_id, %error, "failed to compute next run, job dropped until next reconciliation");
                }
            }
        }

        self.state.store(STOPPED, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::FakeCatalog;
    use std::sync::Mutex as StdMutex;
    use tokio::time::advance;

    #[derive(Default)]
    struct RecordingSink {
        firings: StdMutex<Vec<Firing>>,
    }

    impl FiringSink for RecordingSink {
        fn submit(&self, firing: Firing) -> Result<(), crate::error::OverCapacity> {
            self.firings.lock().unwrap().push(firing);
            Ok(())
        }
    }

    #[tokio::test]
    async fn reconcile_loads_only_active_jobs() {
        let catalog = Arc::new(FakeCatalog::new());
        catalog
            .create("*/1 * * * * *", "http://a", "AT_LEAST_ONCE")
            .await
            .unwrap();
        let inactive = catalog
            .create("*/1 * * * * *", "http://b", "AT_LEAST_ONCE")
            .await
            .unwrap();
        catalog.delete(inactive.job_id).await.unwrap();

        let sink = Arc::new(RecordingSink::default());
        let core = DispatchCore::new(catalog, sink, StdDuration::from_secs(60));
        core.reconcile().await.unwrap();

        assert_eq!(core.scheduled_count().await, 1);
    }

    #[tokio::test]
    async fn reconcile_skips_malformed_schedules_without_failing() {
        let catalog = Arc::new(FakeCatalog::new());
        // Insert directly since `create` would itself reject a bad schedule.
        catalog
            .create("*/1 * * * * *", "http://a", "AT_LEAST_ONCE")
            .await
            .unwrap();

        let sink = Arc::new(RecordingSink::default());
        let core = DispatchCore::new(catalog, sink, StdDuration::from_secs(60));
        assert!(core.reconcile().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn run_dispatches_due_job_and_reschedules_it() {
        let catalog = Arc::new(FakeCatalog::new());
        catalog
            .create("*/1 * * * * *", "http://example.com", "AT_LEAST_ONCE")
            .await
            .unwrap();

        let sink = Arc::new(RecordingSink::default());
        let core = DispatchCore::new(catalog, sink.clone(), StdDuration::from_secs(60));

        let handle = tokio::spawn(core.clone().run());
        advance(StdDuration::from_secs(2)).await;
        tokio::task::yield_now().await;

        core.stop();
        let _ = tokio::time::timeout(StdDuration::from_secs(1), handle).await;

        assert!(!sink.firings.lock().unwrap().is_empty());
        assert_eq!(core.state(), State::Stopped);
    }
}
