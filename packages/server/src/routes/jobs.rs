use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use catalog::{Job, JobUpdate, EXECUTION_TYPE_AT_LEAST_ONCE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub schedule: String,
    pub api_url: String,
    pub execution_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub schedule: Option<String>,
    pub api_url: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub active: Option<bool>,
}

/// A `Job` enriched with `next_run_time`, computed at response time rather
/// than stored (spec §6).
#[derive(Debug, Serialize)]
pub struct JobResponse {
    #[serde(flatten)]
    pub job: Job,
    pub next_run_time: Option<DateTime<Utc>>,
}

impl JobResponse {
    fn from_job(job: Job) -> Self {
        let next_run_time = cron::next(&job.schedule, Utc::now()).ok();
        Self { job, next_run_time }
    }
}

pub async fn create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    let execution_type = request
        .execution_type
        .unwrap_or_else(|| EXECUTION_TYPE_AT_LEAST_ONCE.to_string());
    let job = state
        .catalog
        .create(&request.schedule, &request.api_url, &execution_type)
        .await?;
    state.dispatch.refresh_schedule().await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from_job(job))))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let jobs = match query.active {
        Some(active) => state
            .catalog
            .list_all()
            .await?
            .into_iter()
            .filter(|job| job.active == active)
            .collect(),
        None => state.catalog.list_all().await?,
    };
    Ok(Json(jobs.into_iter().map(JobResponse::from_job).collect()))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state
        .catalog
        .get(job_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {job_id} not found")))?;
    Ok(Json(JobResponse::from_job(job)))
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    let changes = JobUpdate {
        schedule: request.schedule,
        api_url: request.api_url,
        active: request.active,
    };
    let job = state
        .catalog
        .update(job_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {job_id} not found")))?;
    state.dispatch.refresh_schedule().await?;
    Ok(Json(JobResponse::from_job(job)))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.catalog.delete(job_id).await?;
    if !deleted {
        return Err(ApiError::not_found(format!("job {job_id} not found")));
    }
    state.dispatch.refresh_schedule().await?;
    Ok(StatusCode::NO_CONTENT)
}
