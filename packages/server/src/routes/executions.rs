use axum::extract::{Path, Query, State};
use axum::Json;
use catalog::{Execution, ExecutionStats};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListExecutionsQuery {
    pub limit: Option<i64>,
}

async fn ensure_job_exists(state: &AppState, job_id: Uuid) -> Result<(), ApiError> {
    state
        .catalog
        .get(job_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {job_id} not found")))?;
    Ok(())
}

pub async fn list_executions(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<ListExecutionsQuery>,
) -> Result<Json<Vec<Execution>>, ApiError> {
    ensure_job_exists(&state, job_id).await?;
    let limit = query.limit.unwrap_or(50);
    let executions = state.catalog.list_executions(job_id, limit).await?;
    Ok(Json(executions))
}

pub async fn latest_execution(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Execution>, ApiError> {
    ensure_job_exists(&state, job_id).await?;
    let execution = state
        .catalog
        .get_latest_execution(job_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no executions for job {job_id}")))?;
    Ok(Json(execution))
}

pub async fn execution_stats(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ExecutionStats>, ApiError> {
    let stats = state.catalog.stats(job_id).await?;
    Ok(Json(stats))
}
