use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use dispatch::{Firing, FiringSink};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DebugExecuteRequest {
    pub api_url: String,
}

#[derive(Debug, Serialize)]
pub struct DebugExecuteResponse {
    pub job_id: Uuid,
    pub execution_id: Uuid,
    pub status: &'static str,
}

/// Fires an ad-hoc, one-off firing through the execution core's submission
/// queue. A placeholder inactive job row is created first so the recorded
/// Execution satisfies the `job_executions.job_id` foreign key (spec §9).
pub async fn execute(
    State(state): State<AppState>,
    Json(request): Json<DebugExecuteRequest>,
) -> Result<(StatusCode, Json<DebugExecuteResponse>), ApiError> {
    if state.dispatch.state() != dispatch::State::Running {
        return Err(ApiError::service_unavailable("dispatch core is not running"));
    }

    let job_id = Uuid::new_v4();
    let execution_id = Uuid::new_v4();
    state
        .catalog
        .create_placeholder(job_id, &request.api_url)
        .await?;

    let firing = Firing {
        job_id,
        api_url: request.api_url,
        scheduled_time: Utc::now(),
    };

    state
        .execution
        .submit(firing)
        .map_err(|_| ApiError::service_unavailable("execution queue is at capacity"))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DebugExecuteResponse {
            job_id,
            execution_id,
            status: "SUBMITTED",
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct DebugExecuteSyncRequest {
    pub api_url: String,
}

#[derive(Debug, Serialize)]
pub struct DebugExecuteSyncResponse {
    pub status_code: Option<u16>,
    pub ok: bool,
    pub body_excerpt: String,
    pub elapsed_ms: u128,
}

/// Performs a single inline POST against `api_url`, bypassing both the
/// dispatch heap and the execution core's queue entirely. No Execution row
/// is written; this exists only to test reachability (spec §9 supplement).
pub async fn execute_sync(
    Json(request): Json<DebugExecuteSyncRequest>,
) -> Result<Json<DebugExecuteSyncResponse>, ApiError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("reqwest client configuration is valid");

    let started = std::time::Instant::now();
    let response = client
        .post(&request.api_url)
        .json(&serde_json::json!({ "debug": true }))
        .send()
        .await;

    match response {
        Ok(response) => {
            let status_code = response.status().as_u16();
            let ok = response.status().is_success();
            let body = response.text().await.unwrap_or_default();
            Ok(Json(DebugExecuteSyncResponse {
                status_code: Some(status_code),
                ok,
                body_excerpt: body.chars().take(200).collect(),
                elapsed_ms: started.elapsed().as_millis(),
            }))
        }
        Err(error) => Ok(Json(DebugExecuteSyncResponse {
            status_code: None,
            ok: false,
            body_excerpt: error.to_string().chars().take(200).collect(),
            elapsed_ms: started.elapsed().as_millis(),
        })),
    }
}

pub async fn refresh_schedule(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    if state.dispatch.state() != dispatch::State::Running {
        return Err(ApiError::service_unavailable("dispatch core is not running"));
    }
    state.dispatch.refresh_schedule().await?;
    Ok(StatusCode::OK)
}
