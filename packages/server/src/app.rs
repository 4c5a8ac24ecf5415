use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{debug, executions, health, jobs, root};
use crate::state::AppState;

/// Builds the REST surface of spec §6 over a shared [`AppState`].
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root::root_handler))
        .route("/health", get(health::health_handler))
        .route("/jobs", post(jobs::create_job).get(jobs::list_jobs))
        .route(
            "/jobs/:id",
            get(jobs::get_job)
                .put(jobs::update_job)
                .delete(jobs::delete_job),
        )
        .route("/executions/:job_id", get(executions::list_executions))
        .route(
            "/executions/:job_id/latest",
            get(executions::latest_execution),
        )
        .route(
            "/executions/:job_id/stats",
            get(executions::execution_stats),
        )
        .route("/debug/execute", post(debug::execute))
        .route("/debug/execute_sync", post(debug::execute_sync))
        .route("/debug/refresh_schedule", post(debug::refresh_schedule))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
