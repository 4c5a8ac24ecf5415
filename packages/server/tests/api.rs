use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use catalog::FakeCatalog;
use serde_json::{json, Value};
use server::{build_app, AppState};
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let catalog: Arc<dyn catalog::Catalog> = Arc::new(FakeCatalog::new());
    let execution = execution::ExecutionCore::new(
        catalog.clone(),
        execution::ExecutionConfig {
            max_workers: 2,
            max_retries: 0,
            request_timeout: Duration::from_secs(1),
            queue_capacity: 16,
        },
    );
    let dispatch = dispatch::DispatchCore::new(catalog.clone(), execution.clone(), Duration::from_secs(60));

    let state = AppState {
        catalog,
        dispatch,
        execution,
    };
    build_app(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `/health` reports the dispatch core unhealthy unless it is actually
/// `Running`, so this harness drives it there before handing back the app.
async fn test_app_with_running_dispatch() -> (axum::Router, Arc<dispatch::DispatchCore>) {
    let catalog: Arc<dyn catalog::Catalog> = Arc::new(FakeCatalog::new());
    let execution = execution::ExecutionCore::new(
        catalog.clone(),
        execution::ExecutionConfig {
            max_workers: 2,
            max_retries: 0,
            request_timeout: Duration::from_secs(1),
            queue_capacity: 16,
        },
    );
    let dispatch = dispatch::DispatchCore::new(catalog.clone(), execution.clone(), Duration::from_secs(60));
    tokio::spawn(dispatch.clone().run());
    while dispatch.state() != dispatch::State::Running {
        tokio::task::yield_now().await;
    }

    let state = AppState {
        catalog,
        dispatch: dispatch.clone(),
        execution,
    };
    (build_app(state), dispatch)
}

#[tokio::test]
async fn root_and_health_are_reachable() {
    let (app, dispatch) = test_app_with_running_dispatch().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    dispatch.stop();
}

#[tokio::test]
async fn creating_a_job_with_an_invalid_schedule_returns_400() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/jobs")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "schedule": "bogus", "api_url": "http://example.com" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_then_get_then_delete_job_round_trips() {
    let app = test_app();

    let create = Request::builder()
        .method("POST")
        .uri("/jobs")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "schedule": "0 * * * * *", "api_url": "http://example.com/hook" }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let job_id = created["job_id"].as_str().unwrap().to_string();
    assert!(created["next_run_time"].is_string());

    let get = Request::builder()
        .uri(format!("/jobs/{job_id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(get).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/jobs/{job_id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let delete_again = Request::builder()
        .method("DELETE")
        .uri(format!("/jobs/{job_id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(delete_again).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn getting_an_unknown_job_returns_404() {
    let app = test_app();
    let request = Request::builder()
        .uri(format!("/jobs/{}", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
