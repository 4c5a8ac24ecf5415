//! An in-memory [`Catalog`] double, grounded on the same shape as a
//! production-grade test manager: inspectable collections guarded by a
//! `RwLock`, no database required. Used by the `dispatch` and `execution`
//! crates' own test suites.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::CatalogError;
use crate::models::{Execution, ExecutionStats, Job, JobUpdate};
use crate::store::{compute_stats, Catalog};

#[derive(Default)]
pub struct FakeCatalog {
    jobs: RwLock<HashMap<Uuid, Job>>,
    executions: RwLock<HashMap<Uuid, Execution>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: how many executions have been recorded for `job_id`.
    pub fn execution_count(&self, job_id: Uuid) -> usize {
        self.executions
            .read()
            .unwrap()
            .values()
            .filter(|e| e.job_id == job_id)
            .count()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_active(&self) -> Result<Vec<Job>, CatalogError> {
        Ok(self
            .jobs
            .read()
            .unwrap()
            .values()
            .filter(|j| j.active)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Job>, CatalogError> {
        Ok(self.jobs.read().unwrap().values().cloned().collect())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>, CatalogError> {
        Ok(self.jobs.read().unwrap().get(&job_id).cloned())
    }

    async fn create(
        &self,
        schedule: &str,
        api_url: &str,
        execution_type: &str,
    ) -> Result<Job, CatalogError> {
        cron::next(schedule, Utc::now())?;
        let now = Utc::now();
        let job = Job {
            job_id: Uuid::new_v4(),
            schedule: schedule.to_string(),
            api_url: api_url.to_string(),
            execution_type: execution_type.to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.jobs.write().unwrap().insert(job.job_id, job.clone());
        Ok(job)
    }

    async fn update(&self, job_id: Uuid, changes: JobUpdate) -> Result<Option<Job>, CatalogError> {
        if let Some(schedule) = &changes.schedule {
            cron::next(schedule, Utc::now())?;
        }
        let mut jobs = self.jobs.write().unwrap();
        let Some(job) = jobs.get_mut(&job_id) else {
            return Ok(None);
        };
        if let Some(schedule) = changes.schedule {
            job.schedule = schedule;
        }
        if let Some(api_url) = changes.api_url {
            job.api_url = api_url;
        }
        if let Some(active) = changes.active {
            job.active = active;
        }
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn delete(&self, job_id: Uuid) -> Result<bool, CatalogError> {
        let mut jobs = self.jobs.write().unwrap();
        match jobs.get_mut(&job_id) {
            Some(job) => {
                job.active = false;
                job.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_placeholder(&self, job_id: Uuid, api_url: &str) -> Result<(), CatalogError> {
        let mut jobs = self.jobs.write().unwrap();
        jobs.entry(job_id).or_insert_with(|| {
            let now = Utc::now();
            Job {
                job_id,
                schedule: "0 * * * * *".to_string(),
                api_url: api_url.to_string(),
                execution_type: crate::models::EXECUTION_TYPE_AT_LEAST_ONCE.to_string(),
                active: false,
                created_at: now,
                updated_at: now,
            }
        });
        Ok(())
    }

    async fn record_execution(&self, execution: &Execution) -> Result<(), CatalogError> {
        self.executions
            .write()
            .unwrap()
            .entry(execution.execution_id)
            .or_insert_with(|| execution.clone());
        Ok(())
    }

    async fn list_executions(&self, job_id: Uuid, limit: i64) -> Result<Vec<Execution>, CatalogError> {
        let mut matching: Vec<Execution> = self
            .executions
            .read()
            .unwrap()
            .values()
            .filter(|e| e.job_id == job_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }

    async fn get_latest_execution(&self, job_id: Uuid) -> Result<Option<Execution>, CatalogError> {
        Ok(self.list_executions(job_id, 1).await?.into_iter().next())
    }

    async fn stats(&self, job_id: Uuid) -> Result<ExecutionStats, CatalogError> {
        let all = self.list_executions(job_id, i64::MAX).await?;
        Ok(compute_stats(&all))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExecutionStatus, JobUpdate};

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let catalog = FakeCatalog::new();
        let job = catalog
            .create("0 * * * * *", "http://example.com", "AT_LEAST_ONCE")
            .await
            .unwrap();
        let fetched = catalog.get(job.job_id).await.unwrap().unwrap();
        assert_eq!(fetched.job_id, job.job_id);
    }

    #[tokio::test]
    async fn delete_is_soft_and_preserves_execution_history() {
        let catalog = FakeCatalog::new();
        let job = catalog
            .create("0 * * * * *", "http://example.com", "AT_LEAST_ONCE")
            .await
            .unwrap();
        catalog
            .record_execution(&Execution {
                execution_id: Uuid::new_v4(),
                job_id: job.job_id,
                scheduled_time: Utc::now(),
                actual_start_time: Some(Utc::now()),
                status: ExecutionStatus::Success,
                http_status: Some(200),
                duration_ms: Some(5),
                error_message: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        assert!(catalog.delete(job.job_id).await.unwrap());
        let deleted = catalog.get(job.job_id).await.unwrap().unwrap();
        assert!(!deleted.active);

        let executions = catalog.list_executions(job.job_id, 10).await.unwrap();
        assert_eq!(executions.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_invalid_schedule() {
        let catalog = FakeCatalog::new();
        assert!(catalog.create("bogus", "http://example.com", "AT_LEAST_ONCE").await.is_err());
    }

    #[tokio::test]
    async fn update_with_no_fields_leaves_job_unchanged() {
        let catalog = FakeCatalog::new();
        let job = catalog
            .create("0 * * * * *", "http://example.com", "AT_LEAST_ONCE")
            .await
            .unwrap();
        let updated = catalog.update(job.job_id, JobUpdate::default()).await.unwrap().unwrap();
        assert_eq!(updated.schedule, job.schedule);
        assert_eq!(updated.api_url, job.api_url);
    }
}
