//! Conversion of application errors into HTTP responses.

use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use filedrop_core::upload::UploadError;
use filedrop_shared::AppError;
use serde::Serialize;
use tracing::{error, warn};

/// Error payload: `{ "success": false, "error": "..." }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Client-safe message.
    pub error: String,
}

/// An [`AppError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err {
            AppError::ClientInput(_) => StatusCode::BAD_REQUEST,
            AppError::Quota(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Sweep(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if err.is_server_error() {
            error!(code = err.error_code(), error = %err, "Request failed");
        } else {
            warn!(code = err.error_code(), error = %err, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: err.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Response for a handler that panicked.
#[allow(clippy::needless_pass_by_value)]
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    ApiError(AppError::Internal(format!("handler panicked: {detail}"))).into_response()
}
