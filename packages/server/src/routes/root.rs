use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Identification payload (spec §9 supplement, carried from the original's
/// `GET /`).
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        name: "scheduler",
        version: env!("CARGO_PKG_VERSION"),
    })
}
