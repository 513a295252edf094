use std::time::Duration;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mongodb::bson::oid::{self, ObjectId};
use thiserror::Error;

/// Failures raised by an [`EmployeeStore`](crate::db::EmployeeStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),

    #[error("database operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected database response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidId(#[from] oid::Error),

    #[error("{0}")]
    InvalidBody(String),

    /// An edit whose id matched no document. Reported as a client error.
    #[error("no employee matches id {0}")]
    EditTargetMissing(ObjectId),

    #[error("no employee matches id {0}")]
    NotFound(ObjectId),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) | ApiError::InvalidBody(_) | ApiError::EditTargetMissing(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(%status, "request failed: {message}");
        } else {
            tracing::debug!(%status, "request rejected: {message}");
        }
        (status, message).into_response()
    }
}
