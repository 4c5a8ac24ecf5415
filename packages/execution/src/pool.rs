use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration as StdDuration, Instant};

use catalog::{Catalog, Execution, ExecutionStatus};
use chrono::Utc;
use dispatch::{Firing, FiringSink, OverCapacity};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::AttemptError;

/// Tunables the worker pool is sized and bounded by (spec §4.4). Mirrors the
/// `server` crate's environment-backed defaults so the pool can be
/// constructed and unit-tested without pulling in `Config`.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionConfig {
    pub max_workers: usize,
    pub max_retries: u32,
    pub request_timeout: StdDuration,
    /// Depth of the bounded submission queue between dispatch and execution.
    pub queue_capacity: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_workers: 20,
            max_retries: 3,
            request_timeout: StdDuration::from_secs(30),
            queue_capacity: 1024,
        }
    }
}

#[derive(Debug, Serialize)]
struct FiringPayload {
    job_id: Uuid,
    execution_id: Uuid,
    scheduled_time: chrono::DateTime<Utc>,
    actual_time: chrono::DateTime<Utc>,
}

/// A bounded-queue worker pool that receives firings via [`FiringSink`] and
/// performs the POST/retry/record sequence of spec §4.4 on `W` concurrent
/// workers.
pub struct ExecutionCore {
    catalog: Arc<dyn Catalog>,
    client: reqwest::Client,
    config: ExecutionConfig,
    tx: StdMutex<Option<mpsc::Sender<Firing>>>,
    rx: tokio::sync::Mutex<Option<mpsc::Receiver<Firing>>>,
    accepting: AtomicBool,
    workers: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl ExecutionCore {
    pub fn new(catalog: Arc<dyn Catalog>, config: ExecutionConfig) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("reqwest client configuration is valid");

        Arc::new(Self {
            catalog,
            client,
            config,
            tx: StdMutex::new(Some(tx)),
            rx: tokio::sync::Mutex::new(Some(rx)),
            accepting: AtomicBool::new(true),
            workers: tokio::sync::Mutex::new(Vec::new()),
        })
    }

    /// Spawn `max_workers` tasks pulling from the shared submission queue.
    /// Each worker loops independently until the channel closes, which
    /// happens once [`ExecutionCore::stop`] drops the sender side.
    pub async fn start(self: &Arc<Self>) {
        let rx = self
            .rx
            .lock()
            .await
            .take()
            .expect("start() called more than once");
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let mut workers = self.workers.lock().await;
        for worker_id in 0..self.config.max_workers {
            let core = Arc::clone(self);
            let rx = Arc::clone(&rx);
            workers.push(tokio::spawn(async move {
                loop {
                    let firing = { rx.lock().await.recv().await };
                    match firing {
                        Some(firing) => core.execute(firing, worker_id).await,
                        None => break,
                    }
                }
            }));
        }
    }

    /// Stop accepting new submissions, close the submission channel so every
    /// worker's `recv()` returns `None` once it drains whatever it already
    /// dequeued, then wait for every worker task to exit. No in-flight
    /// attempt is force-cancelled; the only bound on how long this takes is
    /// the in-flight attempts' own request timeouts (spec §4.4).
    pub async fn stop(&self) {
        self.accepting.store(false, Ordering::SeqCst);
        self.tx.lock().unwrap().take();

        let mut workers = self.workers.lock().await;
        for worker in workers.drain(..) {
            let _ = worker.await;
        }
    }

    async fn execute(&self, firing: Firing, worker_id: usize) {
        let span = tracing::info_span!("firing", worker_id, job_id = %firing.job_id);
        let _guard = span.enter();

        let execution = self.run_attempts(firing).await;
        self.record_with_retry(&execution).await;
    }

    /// Record a firing's terminal outcome, retrying once at the call site on
    /// a store failure before dropping it (spec §7: a `StoreError` during
    /// execution recording is "retried once... else dropped").
    async fn record_with_retry(&self, execution: &Execution) {
        if let Err(error) = self.catalog.record_execution(execution).await {
            tracing::warn!(%error, "failed to record execution outcome, retrying once");
            if let Err(error) = self.catalog.record_execution(execution).await {
                tracing::error!(%error, "failed to record execution outcome after retry, dropping");
            }
        }
    }

    /// Run a firing synchronously and record its outcome, returning the
    /// recorded [`Execution`]. Used by the `/debug/execute_sync` surface
    /// (spec §9 supplement), which bypasses the submission queue entirely.
    pub async fn execute_and_record(&self, firing: Firing) -> Execution {
        let execution = self.run_attempts(firing).await;
        self.record_with_retry(&execution).await;
        execution
    }

    async fn run_attempts(&self, firing: Firing) -> Execution {
        let execution_id = Uuid::new_v4();
        let actual_start_time = Utc::now();

        let payload = FiringPayload {
            job_id: firing.job_id,
            execution_id,
            scheduled_time: firing.scheduled_time,
            actual_time: actual_start_time,
        };

        let max_attempts = self.config.max_retries + 1;
        let mut attempt: u32 = 0;
        let mut last_http_status: Option<i32> = None;
        let mut last_error: Option<String> = None;
        let mut success_duration_ms: Option<i64> = None;

        while attempt < max_attempts {
            attempt += 1;
            let attempt_start = Instant::now();

            match self.attempt(&firing.api_url, &payload).await {
                Ok(status) => {
                    success_duration_ms = Some(attempt_start.elapsed().as_millis() as i64);
                    last_http_status = Some(status);
                    break;
                }
                Err(AttemptError::Application { status, body }) => {
                    last_http_status = Some(status);
                    last_error = Some(truncate(&format!("{status}: {body}"), 200));
                }
                Err(AttemptError::Transport(message)) => {
                    last_http_status = None;
                    last_error = Some(truncate(&message, 200));
                }
            }

            if attempt < max_attempts {
                let backoff = StdDuration::from_secs(2u64.saturating_pow(attempt).min(30));
                tokio::time::sleep(backoff).await;
            }
        }

        if let Some(duration_ms) = success_duration_ms {
            Execution {
                execution_id,
                job_id: firing.job_id,
                scheduled_time: firing.scheduled_time,
                actual_start_time: Some(actual_start_time),
                status: ExecutionStatus::Success,
                http_status: last_http_status,
                duration_ms: Some(duration_ms),
                error_message: None,
                created_at: Utc::now(),
            }
        } else {
            Execution {
                execution_id,
                job_id: firing.job_id,
                scheduled_time: firing.scheduled_time,
                actual_start_time: Some(actual_start_time),
                status: ExecutionStatus::Failed,
                http_status: last_http_status,
                duration_ms: None,
                error_message: Some(last_error.unwrap_or_else(|| "unknown failure".to_string())),
                created_at: Utc::now(),
            }
        }
    }

    /// Perform one POST attempt and classify its outcome (spec §4.4).
    /// A 2xx status is success; any other status, including 3xx, is an
    /// application failure (REDESIGN resolution of the 3xx ambiguity).
    async fn attempt(
        &self,
        api_url: &str,
        payload: &FiringPayload,
    ) -> Result<i32, AttemptError> {
        let response = self
            .client
            .post(api_url)
            .json(payload)
            .send()
            .await
            .map_err(|error| AttemptError::Transport(error.to_string()))?;

        let status = response.status().as_u16() as i32;
        if response.status().is_success() {
            return Ok(status);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AttemptError::Application { status, body })
    }
}

impl FiringSink for ExecutionCore {
    fn submit(&self, firing: Firing) -> Result<(), OverCapacity> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(OverCapacity);
        }
        match &*self.tx.lock().unwrap() {
            Some(tx) => tx.try_send(firing).map_err(|_| OverCapacity),
            None => Err(OverCapacity),
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}
