//! Uniform `{code, message, data}` response envelope.
//!
//! # Invariants
//! - `code` always equals the HTTP status of the response carrying it.
//! - Error responses always carry `data: null`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info};
use serde::{Deserialize, Serialize};
use todo_core::{TodoId, TodoServiceError};

/// Response wrapper applied to every payload at the HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status code, mirrored into the body.
    pub code: u16,
    /// Human-readable outcome.
    pub message: String,
    /// Payload, `null` for errors and bodiless successes.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data,
        }
    }

    /// 200 with payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, Some(data))
    }

    /// 201 with payload.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, Some(data))
    }
}

impl ApiResponse<()> {
    /// Envelope with `data: null`.
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Error rendered through the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(id: TodoId) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("todo not found: {id}"))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Maps an operation failure to its status code and logs it.
    ///
    /// Storage details are logged but not echoed to the client.
    pub fn from_service(operation: &'static str, err: TodoServiceError) -> Self {
        match err {
            TodoServiceError::InvalidInput(_) | TodoServiceError::InvalidFilter(_) => {
                info!(
                    "event={} module=api status=rejected error_code=bad_request",
                    operation
                );
                Self::bad_request(err.to_string())
            }
            TodoServiceError::NotFound(id) => {
                info!(
                    "event={} module=api status=rejected error_code=not_found id={}",
                    operation, id
                );
                Self::not_found(id)
            }
            TodoServiceError::StorageUnavailable(ref source) => {
                error!(
                    "event={} module=api status=error error_code=storage_unavailable error={}",
                    operation, source
                );
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "storage unavailable")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiResponse::empty(self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, ApiResponse};
    use axum::http::StatusCode;
    use todo_core::{RepoError, TodoServiceError, TodoValidationError};

    #[test]
    fn envelope_serializes_null_data() {
        let envelope = ApiResponse::empty(StatusCode::OK, "todo deleted");
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json["code"], 200);
        assert_eq!(json["message"], "todo deleted");
        assert!(json["data"].is_null());
    }

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases = [
            (
                TodoServiceError::InvalidInput(TodoValidationError::EmptyTitle),
                StatusCode::BAD_REQUEST,
            ),
            (
                TodoServiceError::InvalidFilter("done".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (TodoServiceError::NotFound(3), StatusCode::NOT_FOUND),
            (
                TodoServiceError::StorageUnavailable(RepoError::InvalidData("x".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from_service("test", err).status(), expected);
        }
    }

    #[test]
    fn storage_errors_do_not_leak_details() {
        let err = ApiError::from_service(
            "test",
            TodoServiceError::StorageUnavailable(RepoError::InvalidData(
                "secret path".to_string(),
            )),
        );
        assert_eq!(err.message(), "storage unavailable");
    }
}
