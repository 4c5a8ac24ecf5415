use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Translates internal error kinds to HTTP status codes (spec §7).
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl From<catalog::CatalogError> for ApiError {
    fn from(error: catalog::CatalogError) -> Self {
        match error {
            catalog::CatalogError::InvalidSchedule(cron_error) => {
                Self::bad_request(cron_error.to_string())
            }
            catalog::CatalogError::NotFound(job_id) => {
                Self::not_found(format!("job {job_id} not found"))
            }
            catalog::CatalogError::Store(store_error) => {
                tracing::error!(error = %store_error, "catalog store error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "internal store error".to_string(),
                }
            }
        }
    }
}

impl From<dispatch::DispatchError> for ApiError {
    fn from(error: dispatch::DispatchError) -> Self {
        match error {
            dispatch::DispatchError::Catalog(catalog_error) => catalog_error.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
