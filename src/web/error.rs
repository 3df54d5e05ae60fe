//! API error handling for the filedrop web layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::FiledropError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Not found (404).
    NotFound,
    /// Payload too large (413).
    PayloadTooLarge,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message.
    pub error: String,
    /// Bucket the request was about, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    directory: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            directory: None,
        }
    }

    /// Attach the bucket the error refers to.
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a payload too large error.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Error code of this error.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            success: false,
            error: self.message,
            directory: self.directory,
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<FiledropError> for ApiError {
    fn from(err: FiledropError) -> Self {
        match &err {
            FiledropError::InvalidFolder(folder) => ApiError::bad_request(format!(
                "Invalid folder '{folder}'. Must be 'uploads' or 'downloads'"
            )),
            FiledropError::InvalidName(_) => ApiError::bad_request("Invalid filename"),
            FiledropError::PathTraversal(_) => ApiError::bad_request("Invalid file path"),
            FiledropError::PayloadTooLarge { limit } => ApiError::payload_too_large(format!(
                "File too large. Maximum size is {}MB",
                limit / 1024 / 1024
            )),
            FiledropError::NotFound(_) => ApiError::not_found("File not found"),
            _ => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_filedrop_error() {
        let cases = [
            (FiledropError::InvalidFolder("x".into()), ErrorCode::BadRequest),
            (FiledropError::InvalidName("..".into()), ErrorCode::BadRequest),
            (FiledropError::PathTraversal("../x".into()), ErrorCode::BadRequest),
            (
                FiledropError::PayloadTooLarge { limit: 1024 * 1024 },
                ErrorCode::PayloadTooLarge,
            ),
            (FiledropError::NotFound("file".into()), ErrorCode::NotFound),
            (
                FiledropError::StorageIo(std::io::Error::other("disk full")),
                ErrorCode::InternalError,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(ApiError::from(err).code(), code);
        }
    }

    #[test]
    fn test_payload_too_large_message() {
        let err = ApiError::from(FiledropError::PayloadTooLarge {
            limit: 50 * 1024 * 1024,
        });
        assert_eq!(err.message(), "File too large. Maximum size is 50MB");
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err = ApiError::from(FiledropError::StorageIo(std::io::Error::other(
            "/secret/path: permission denied",
        )));
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody {
            success: false,
            error: "File not found".to_string(),
            directory: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "File not found"}));
    }
}
