use crate::JobError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// A [`JobError`] rendered as a JSON error response
#[derive(Debug)]
pub struct ApiError(pub JobError);

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match &self.0 {
            JobError::InvalidParameters(_) => "INVALID_PARAMETERS",
            JobError::DispatchUnavailable(_) => "DISPATCH_UNAVAILABLE",
            JobError::UnknownTask { .. } => "UNKNOWN_TASK",
            JobError::WorkerFailure { .. } => "WORKER_FAILURE",
            JobError::PollTimeout { .. } => "POLL_TIMEOUT",
            JobError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        status_for(&self.0)
    }
}

pub(crate) fn status_for(error: &JobError) -> StatusCode {
    match error {
        JobError::InvalidParameters(_) => StatusCode::BAD_REQUEST,
        JobError::DispatchUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        JobError::UnknownTask { .. } => StatusCode::NOT_FOUND,
        JobError::WorkerFailure { .. } => StatusCode::BAD_GATEWAY,
        JobError::PollTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        JobError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<JobError> for ApiError {
    fn from(error: JobError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self.0);
        }
        let body = json!({
            "error_code": self.error_code(),
            "error_message": self.0.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
