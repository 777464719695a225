use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, state::InvalidTransition};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed while serving the request.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// No identity was attached to a request that requires one.
    #[error("{0}")]
    Unauthenticated(String),
    /// The caller is identified but not allowed to act on the room.
    #[error("{0}")]
    Forbidden(String),
    /// Invalid input provided by the client.
    #[error("{0}")]
    InvalidInput(String),
    /// The room is not in a state that allows the operation.
    #[error("{0}")]
    Precondition(String),
    /// A conditional write lost against a concurrent or earlier one.
    #[error("{0}")]
    Conflict(String),
    /// Requested resource was not found.
    #[error("{0}")]
    NotFound(String),
    /// The first write of a multi-step operation succeeded, a later one failed.
    #[error("{message}")]
    PartialFailure {
        /// Room stored by the first write.
        room_id: Uuid,
        /// What was left undone.
        message: String,
        /// Failure of the later write.
        #[source]
        source: StorageError,
    },
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::Precondition(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input, failed precondition or lost race.
    #[error("{0}")]
    BadRequest(String),
    /// Missing identity.
    #[error("{0}")]
    Unauthorized(String),
    /// Identity not allowed to act on the resource.
    #[error("{0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Service unavailable or degraded.
    #[error("{0}")]
    ServiceUnavailable(String),
    /// Internal server error, optionally pointing at the room left behind.
    #[error("{message}")]
    Internal {
        /// Message sent to the client.
        message: String,
        /// Room left behind, if any.
        room_id: Option<Uuid>,
    },
}

impl AppError {
    fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
            room_id: None,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => {
                error!(error = %source, "storage operation failed");
                AppError::internal(source.to_string())
            }
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Unauthenticated(message) => AppError::Unauthorized(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::InvalidInput(message)
            | ServiceError::Precondition(message)
            | ServiceError::Conflict(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::PartialFailure {
                room_id,
                message,
                source,
            } => {
                error!(%room_id, error = %source, "{message}");
                AppError::Internal {
                    message,
                    room_id: Some(room_id),
                }
            }
        }
    }
}

/// JSON body of every error response.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human readable failure message.
    pub error: String,
    /// Room left behind by a partially failed operation.
    #[serde(default)]
    pub room_id: Option<Uuid>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let room_id = match &self {
            AppError::Internal { room_id, .. } => *room_id,
            _ => None,
        };

        let payload = Json(ErrorBody {
            error: self.to_string(),
            room_id,
        });

        (status, payload).into_response()
    }
}
