//! Universal error handling for the API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notification_storage::notification::NotificationStorageError;
use serde::Serialize;

use crate::jwt::JwtError;

/// API error response envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: msg },
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl From<NotificationStorageError> for AppError {
    fn from(err: NotificationStorageError) -> Self {
        use NotificationStorageError::{
            DynamoDbDeleteError, DynamoDbGetError, DynamoDbPutError, DynamoDbQueryError,
            DynamoDbUpdateError, NotificationExists, NotificationNotFound,
            ParseNotificationError, SerializationError,
        };

        match &err {
            NotificationNotFound => {
                tracing::debug!("Notification not found");
                Self::new(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "Notification not found",
                    false,
                )
            }
            NotificationExists => {
                tracing::debug!("Notification already exists");
                Self::new(
                    StatusCode::CONFLICT,
                    "already_exists",
                    "Notification already exists",
                    false,
                )
            }
            DynamoDbPutError(_)
            | DynamoDbGetError(_)
            | DynamoDbUpdateError(_)
            | DynamoDbQueryError(_)
            | DynamoDbDeleteError(_) => {
                tracing::error!("DynamoDB error: {err}");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "database_error",
                    "Database service temporarily unavailable",
                    true,
                )
            }
            SerializationError(msg) | ParseNotificationError(msg) => {
                tracing::error!("Serialization/Parse error: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                    false,
                )
            }
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        tracing::warn!("Token validation failed: {err}");
        Self::new(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Invalid or expired token",
            false,
        )
    }
}
