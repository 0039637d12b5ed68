//! HTTP error mapping.

use crate::activity::services::ActivityError;
use crate::daily::SchedulerError;
use crate::task::{
    domain::TaskDomainError, ports::TaskRepositoryError, services::TaskLifecycleError,
};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by API handlers, rendered as
/// `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed path, query or body.
    #[error("{0}")]
    BadRequest(String),
    /// Missing or wrong admin token.
    #[error("missing or invalid admin token")]
    Unauthorized,
    /// Referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Request raced with another writer or a running job.
    #[error("{0}")]
    Conflict(String),
    /// Well-formed request the domain rules reject.
    #[error("{0}")]
    Unprocessable(String),
    /// Unexpected failure; details are logged, not returned.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if let Self::Internal(detail) = &self {
            error!(error = %detail, "request failed");
        }
        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<TaskDomainError> for ApiError {
    fn from(err: TaskDomainError) -> Self {
        match err {
            TaskDomainError::InvalidTransition { .. } | TaskDomainError::InconsistentHistory { .. } => {
                Self::Unprocessable(err.to_string())
            }
            TaskDomainError::EmptyIdentifier { .. }
            | TaskDomainError::InvalidDedupKey(_)
            | TaskDomainError::InvalidWeight(_)
            | TaskDomainError::InvalidScheduleDay(_) => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<TaskRepositoryError> for ApiError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(_) => Self::NotFound(err.to_string()),
            TaskRepositoryError::Conflict { .. }
            | TaskRepositoryError::DuplicateDedupKey(_)
            | TaskRepositoryError::DuplicateTask(_) => Self::Conflict(err.to_string()),
            TaskRepositoryError::Persistence(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<TaskLifecycleError> for ApiError {
    fn from(err: TaskLifecycleError) -> Self {
        match err {
            TaskLifecycleError::NotFound(_) => Self::NotFound(err.to_string()),
            TaskLifecycleError::InvalidStatus(_) => Self::BadRequest(err.to_string()),
            TaskLifecycleError::Domain(inner) => inner.into(),
            TaskLifecycleError::Repository(inner) => inner.into(),
        }
    }
}

impl From<ActivityError> for ApiError {
    fn from(err: ActivityError) -> Self {
        match err {
            ActivityError::InvalidRange { .. } => Self::BadRequest(err.to_string()),
            ActivityError::Domain(inner) => inner.into(),
            ActivityError::Repository(inner) => Self::Internal(inner.to_string()),
        }
    }
}

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::RunInProgress => Self::Conflict(err.to_string()),
            SchedulerError::RunAborted | SchedulerError::ZeroInterval => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
