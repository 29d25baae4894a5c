use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

/// Error response rendered as `{"error": ..., "detail": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, detail: Option<String>) -> Self {
        Self { status, error, detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = ?self.detail, "{}", self.error);
        }
        let body = serde_json::json!({"error": self.error, "detail": self.detail});
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let detail = Some(e.to_string());
        match e {
            ServiceError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", detail),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", detail),
            ServiceError::Conflict(_) => Self::new(StatusCode::BAD_REQUEST, "Already Exists", detail),
            ServiceError::Upstream(_) => Self::new(StatusCode::BAD_GATEWAY, "Upstream Error", detail),
            ServiceError::Persistence(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Storage Error", detail),
        }
    }
}
