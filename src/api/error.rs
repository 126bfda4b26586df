//! Error translation boundary.
//!
//! Handlers return `Result<_, ApiError>`. Anything that is not already a
//! domain error arrives as `anyhow::Error` and is classified here:
//! uniqueness violations become 409, malformed JSON 400, validation failures
//! 422, and everything else a generic 500 whose details only reach the logs.

use super::response::{self, messages};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;
use thiserror::Error;
use tracing::error;

const UNIQUE_VIOLATION: &str = "23505";

/// Input failed one or more shape rules; each entry is a user-facing message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Validation failed: {}", .0.join(", "))]
pub struct ValidationErrors(pub Vec<String>);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("All required fields must be provided")]
    MissingFields,
    #[error("{0}")]
    Forbidden(String),
    #[error("Email already exists")]
    EmailExists,
    #[error("Username already exists")]
    UsernameExists,
    #[error("Resource already exists")]
    Conflict,
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("Invalid request format")]
    InvalidFormat,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Resource not found")]
    NotFound,
    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingFields | Self::InvalidFormat => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::EmailExists | Self::UsernameExists | Self::Conflict => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(sqlx_err) = cause.downcast_ref::<sqlx::Error>() {
                if is_unique_violation(sqlx_err) {
                    return Self::Conflict;
                }
            }
            if cause.downcast_ref::<serde_json::Error>().is_some() {
                return Self::InvalidFormat;
            }
            if let Some(validation) = cause.downcast_ref::<ValidationErrors>() {
                return Self::Validation(validation.clone());
            }
        }
        Self::Internal(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        anyhow::Error::from(err).into()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(_: serde_json::Error) -> Self {
        Self::InvalidFormat
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidCredentials => {
                response::unauthorized(Some(messages::INVALID_CREDENTIALS), None).into_response()
            }
            Self::MissingFields => response::missing_fields().into_response(),
            Self::Forbidden(message) => response::forbidden(Some(&message), None).into_response(),
            Self::EmailExists => response::email_exists().into_response(),
            Self::UsernameExists => response::username_exists().into_response(),
            Self::Conflict => {
                response::conflict(Some("Resource already exists"), None).into_response()
            }
            Self::Validation(ValidationErrors(details)) => {
                response::validation_error(None, Some(&details.join(", "))).into_response()
            }
            Self::InvalidFormat => response::invalid_format().into_response(),
            Self::Unauthorized => response::unauthorized(None, None).into_response(),
            Self::NotFound => response::not_found(None, None).into_response(),
            Self::Internal(err) => {
                error!("API Error: {err:#}");
                response::internal_error(None, None).into_response()
            }
        }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| code.as_ref() == UNIQUE_VIOLATION),
        _ => false,
    }
}

/// Render a panic inside a handler as the generic 500 envelope.
#[allow(clippy::needless_pass_by_value)]
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {detail}");
    response::internal_error(None, None).into_response()
}
