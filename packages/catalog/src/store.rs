use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::CatalogError;
use crate::models::{Execution, ExecutionStats, Job, JobUpdate};

/// The narrow durable-store contract the dispatch and execution cores rely
/// on (spec §4.2). The store decides nothing about scheduling; it only
/// persists and retrieves.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Job>, CatalogError>;
    async fn list_all(&self) -> Result<Vec<Job>, CatalogError>;
    async fn get(&self, job_id: Uuid) -> Result<Option<Job>, CatalogError>;
    async fn create(
        &self,
        schedule: &str,
        api_url: &str,
        execution_type: &str,
    ) -> Result<Job, CatalogError>;
    async fn update(&self, job_id: Uuid, changes: JobUpdate) -> Result<Option<Job>, CatalogError>;
    async fn delete(&self, job_id: Uuid) -> Result<bool, CatalogError>;

    /// Insert an inactive placeholder job row so an ad-hoc firing (spec §9,
    /// the debug surface) can satisfy the `job_executions.job_id` FK
    /// without going through [`Catalog::create`].
    async fn create_placeholder(&self, job_id: Uuid, api_url: &str) -> Result<(), CatalogError>;

    /// Idempotent on `execution_id` collision: a retried record after a
    /// transient DB failure at the call site is a safe no-op.
    async fn record_execution(&self, execution: &Execution) -> Result<(), CatalogError>;
    async fn list_executions(&self, job_id: Uuid, limit: i64) -> Result<Vec<Execution>, CatalogError>;
    async fn get_latest_execution(&self, job_id: Uuid) -> Result<Option<Execution>, CatalogError>;
    async fn stats(&self, job_id: Uuid) -> Result<ExecutionStats, CatalogError>;
}

/// Postgres-backed implementation of [`Catalog`].
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const JOB_COLUMNS: &str =
    "job_id, schedule, api_url, execution_type, active, created_at, updated_at";
const EXECUTION_COLUMNS: &str = "execution_id, job_id, scheduled_time, actual_start_time, \
    status, http_status, duration_ms, error_message, created_at";

#[async_trait]
impl Catalog for PostgresCatalog {
    async fn list_active(&self) -> Result<Vec<Job>, CatalogError> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE active = true"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn list_all(&self) -> Result<Vec<Job>, CatalogError> {
        let jobs = sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM jobs"))
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>, CatalogError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE job_id = $1"
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn create(
        &self,
        schedule: &str,
        api_url: &str,
        execution_type: &str,
    ) -> Result<Job, CatalogError> {
        if !cron::validate(schedule) {
            // Delegate to the evaluator's own parse error so the caller gets a
            // precise reason, not just "invalid".
            cron::next(schedule, Utc::now())?;
        }
        let job_id = Uuid::new_v4();
        let now = Utc::now();
        let job = sqlx::query_as::<_, Job>(&format!(
            "INSERT INTO jobs ({JOB_COLUMNS}) VALUES ($1, $2, $3, $4, true, $5, $5) \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(job_id)
        .bind(schedule)
        .bind(api_url)
        .bind(execution_type)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    async fn update(&self, job_id: Uuid, changes: JobUpdate) -> Result<Option<Job>, CatalogError> {
        if let Some(schedule) = &changes.schedule {
            if !cron::validate(schedule) {
                cron::next(schedule, Utc::now())?;
            }
        }
        let now = Utc::now();
        let job = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs SET \
                schedule = COALESCE($2, schedule), \
                api_url = COALESCE($3, api_url), \
                active = COALESCE($4, active), \
                updated_at = $5 \
             WHERE job_id = $1 \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(job_id)
        .bind(changes.schedule)
        .bind(changes.api_url)
        .bind(changes.active)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn delete(&self, job_id: Uuid) -> Result<bool, CatalogError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE jobs SET active = false, updated_at = $2 WHERE job_id = $1",
        )
        .bind(job_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_placeholder(&self, job_id: Uuid, api_url: &str) -> Result<(), CatalogError> {
        let now = Utc::now();
        sqlx::query(&format!(
            "INSERT INTO jobs ({JOB_COLUMNS}) VALUES ($1, $2, $3, $4, false, $5, $5) \
             ON CONFLICT (job_id) DO NOTHING"
        ))
        .bind(job_id)
        .bind("0 * * * * *")
        .bind(api_url)
        .bind(crate::models::EXECUTION_TYPE_AT_LEAST_ONCE)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_execution(&self, execution: &Execution) -> Result<(), CatalogError> {
        sqlx::query(&format!(
            "INSERT INTO job_executions ({EXECUTION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (execution_id) DO NOTHING"
        ))
        .bind(execution.execution_id)
        .bind(execution.job_id)
        .bind(execution.scheduled_time)
        .bind(execution.actual_start_time)
        .bind(execution.status)
        .bind(execution.http_status)
        .bind(execution.duration_ms)
        .bind(&execution.error_message)
        .bind(execution.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_executions(&self, job_id: Uuid, limit: i64) -> Result<Vec<Execution>, CatalogError> {
        let executions = sqlx::query_as::<_, Execution>(&format!(
            "SELECT {EXECUTION_COLUMNS} FROM job_executions \
             WHERE job_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(job_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(executions)
    }

    async fn get_latest_execution(&self, job_id: Uuid) -> Result<Option<Execution>, CatalogError> {
        let execution = sqlx::query_as::<_, Execution>(&format!(
            "SELECT {EXECUTION_COLUMNS} FROM job_executions \
             WHERE job_id = $1 ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(execution)
    }

    async fn stats(&self, job_id: Uuid) -> Result<ExecutionStats, CatalogError> {
        let executions = self.list_executions(job_id, i64::MAX).await?;
        Ok(compute_stats(&executions))
    }
}

/// Pure aggregation, split out from the SQL path so it can be unit-tested
/// without a database and reused by [`PostgresCatalog::stats`].
pub fn compute_stats(executions: &[Execution]) -> ExecutionStats {
    use crate::models::ExecutionStatus;

    let total = executions.len() as i64;
    if total == 0 {
        return ExecutionStats {
            total: 0,
            success: 0,
            failure: 0,
            success_rate: 0.0,
            avg_duration_ms: None,
            avg_drift_ms: None,
        };
    }

    let success = executions
        .iter()
        .filter(|e| e.status == ExecutionStatus::Success)
        .count() as i64;
    let failure = total - success;

    let durations: Vec<i64> = executions.iter().filter_map(|e| e.duration_ms).collect();
    let avg_duration_ms = if durations.is_empty() {
        None
    } else {
        Some(durations.iter().sum::<i64>() as f64 / durations.len() as f64)
    };

    let drifts: Vec<i64> = executions.iter().filter_map(|e| e.drift_ms()).collect();
    let avg_drift_ms = if drifts.is_empty() {
        None
    } else {
        Some(drifts.iter().sum::<i64>() as f64 / drifts.len() as f64)
    };

    ExecutionStats {
        total,
        success,
        failure,
        success_rate: (success as f64 / total as f64) * 100.0,
        avg_duration_ms,
        avg_drift_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExecutionStatus;
    use chrono::Duration;

    fn execution(status: ExecutionStatus, duration_ms: Option<i64>, drift_ms: i64) -> Execution {
        let scheduled = Utc::now();
        Execution {
            execution_id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            scheduled_time: scheduled,
            actual_start_time: Some(scheduled + Duration::milliseconds(drift_ms)),
            status,
            http_status: if status == ExecutionStatus::Success {
                Some(200)
            } else {
                Some(500)
            },
            duration_ms,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stats_of_empty_history_is_all_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.avg_duration_ms, None);
    }

    #[test]
    fn stats_match_spec_s6_scenario() {
        let executions: Vec<Execution> = (1..=10)
            .map(|i| execution(ExecutionStatus::Success, Some(i * 10), 0))
            .collect();
        let stats = compute_stats(&executions);
        assert_eq!(stats.total, 10);
        assert_eq!(stats.success, 10);
        assert_eq!(stats.failure, 0);
        assert_eq!(stats.success_rate, 100.0);
        assert_eq!(stats.avg_duration_ms, Some(55.0));
    }

    #[test]
    fn failed_attempts_are_excluded_from_duration_average_but_not_drift() {
        let executions = vec![
            execution(ExecutionStatus::Success, Some(100), 50),
            execution(ExecutionStatus::Failed, None, 200),
        ];
        let stats = compute_stats(&executions);
        assert_eq!(stats.avg_duration_ms, Some(100.0));
        assert_eq!(stats.avg_drift_ms, Some(125.0));
    }
}
