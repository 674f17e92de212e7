//! API error types with structured JSON responses.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::QualityError;

/// Structured error response body.
///
/// `detail` repeats the message as a flat string for clients that only
/// look for `{"detail": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Invalid image data: {0}")]
    InvalidImageData(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InvalidImageData(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InvalidImageData(_) => "INVALID_IMAGE_DATA",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                "An internal error occurred".to_string()
            }
            ApiError::UnsupportedMediaType(detail)
            | ApiError::PayloadTooLarge(detail)
            | ApiError::InvalidImageData(detail)
            | ApiError::BadRequest(detail) => {
                tracing::debug!(code, detail = %detail, "Request rejected");
                detail
            }
        };

        let body = ErrorBody {
            detail: message.clone(),
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<QualityError> for ApiError {
    fn from(err: QualityError) -> Self {
        match err {
            QualityError::UnsupportedMediaType(detail) => ApiError::UnsupportedMediaType(detail),
            QualityError::PayloadTooLarge { size, limit } => ApiError::PayloadTooLarge(format!(
                "upload of {size} bytes exceeds the {} MB limit",
                limit / (1024 * 1024)
            )),
            QualityError::InvalidImageData(detail) => ApiError::InvalidImageData(detail),
        }
    }
}

/// Errors while streaming multipart fields. A body over `DefaultBodyLimit`
/// surfaces here as a 413.
impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}
