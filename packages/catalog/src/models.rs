use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persistent scheduled job (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub job_id: Uuid,
    pub schedule: String,
    pub api_url: String,
    pub execution_type: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The only execution semantics the store currently models; reserved as a
/// string column for forward compatibility with future variants.
pub const EXECUTION_TYPE_AT_LEAST_ONCE: &str = "AT_LEAST_ONCE";

/// Partial update for [`Job`]; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub schedule: Option<String>,
    pub api_url: Option<String>,
    pub active: Option<bool>,
}

/// Terminal outcome of one firing's attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    Success,
    Failed,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "SUCCESS"),
            ExecutionStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// A persistent record of one attempt sequence for one firing (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Execution {
    pub execution_id: Uuid,
    pub job_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub status: ExecutionStatus,
    pub http_status: Option<i32>,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Execution {
    /// `actual_start_time - scheduled_time` in milliseconds, when both are known.
    pub fn drift_ms(&self) -> Option<i64> {
        self.actual_start_time
            .map(|actual| (actual - self.scheduled_time).num_milliseconds())
    }
}

/// Aggregated execution statistics for a job (spec §4.2, §8 S6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub total: i64,
    pub success: i64,
    pub failure: i64,
    pub success_rate: f64,
    pub avg_duration_ms: Option<f64>,
    pub avg_drift_ms: Option<f64>,
}
