use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::repository::RepositoryError;

/// AppError
///
/// The single error type raised by the service layer and returned by every handler.
/// The variants are transport agnostic; [`IntoResponse`] below is the only place they are
/// translated into HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The target entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule was violated (duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// The access policy denied the action. Carries the policy's reason.
    #[error("{0}")]
    Forbidden(String),

    /// The request payload is malformed or fails validation.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired credentials.
    #[error("invalid credentials")]
    Unauthorized,

    #[error(transparent)]
    Repository(RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // Storage-level uniqueness is reported the same way as the service-level check.
            RepositoryError::UniqueViolation(message) => AppError::Conflict(message),
            other => AppError::Repository(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// AppJson
///
/// `axum::Json` whose rejection is an [`AppError`], so an unreadable body (missing field,
/// unknown role, wrong content type) gets the same 400 and JSON body as any other
/// validation failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Repository(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ErrorResponse
///
/// The JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub message: String,
    /// Upper-snake reason phrase, e.g. `NOT_FOUND`.
    pub status: String,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Repository(e) => {
                tracing::error!("repository failure: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("internal failure: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            message,
            status: status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_uppercase()
                .replace(' ', "_"),
            timestamp: Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}
