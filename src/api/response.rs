//! Uniform response envelope.
//!
//! Every API answer is `{success, status, message, data?, error?, timestamp}`.
//! Handlers build successes with [`ok`] / [`created`]; failures normally go
//! through [`crate::api::error::ApiError`], which renders with the helpers below.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub mod messages {
    pub const BAD_REQUEST: &str = "Bad request";
    pub const UNAUTHORIZED: &str = "Unauthorized";
    pub const FORBIDDEN: &str = "Forbidden";
    pub const NOT_FOUND: &str = "Resource not found";
    pub const CONFLICT: &str = "Resource conflict";
    pub const VALIDATION_ERROR: &str = "Validation error";
    pub const INTERNAL_ERROR: &str = "Internal server error";
    pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
    pub const EMAIL_EXISTS: &str = "Email already exists";
    pub const USERNAME_EXISTS: &str = "Username already exists";
    pub const INVALID_FORMAT: &str = "Invalid request format";
    pub const MISSING_FIELDS: &str = "All required fields must be provided";

    pub const CREATED: &str = "Resource created successfully";
    pub const LOGIN_SUCCESS: &str = "Login successful";
    pub const REGISTER_SUCCESS: &str = "Registration successful";
    pub const LOGOUT_SUCCESS: &str = "Logout successful";
    pub const FETCHED: &str = "Data retrieved successfully";
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T, message: &str, status: StatusCode) -> Self {
        Self {
            success: true,
            status: status.as_u16(),
            message: message.to_string(),
            data: Some(data),
            error: None,
            timestamp: timestamp(),
        }
    }

    /// Error envelope; `error` falls back to the message when no detail is given.
    #[must_use]
    pub fn failure(message: &str, status: StatusCode, error: Option<&str>) -> Self {
        Self {
            success: false,
            status: status.as_u16(),
            message: message.to_string(),
            data: None,
            error: Some(error.unwrap_or(message).to_string()),
            timestamp: timestamp(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.success
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// ISO 8601 UTC with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub type ErrorResponse = ApiResponse<()>;

pub fn ok<T>(data: T, message: Option<&str>) -> ApiResponse<T> {
    ApiResponse::success(data, message.unwrap_or(messages::FETCHED), StatusCode::OK)
}

pub fn created<T>(data: T, message: Option<&str>) -> ApiResponse<T> {
    ApiResponse::success(
        data,
        message.unwrap_or(messages::CREATED),
        StatusCode::CREATED,
    )
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

pub fn bad_request(message: Option<&str>, error: Option<&str>) -> ErrorResponse {
    ApiResponse::failure(
        message.unwrap_or(messages::BAD_REQUEST),
        StatusCode::BAD_REQUEST,
        error,
    )
}

pub fn unauthorized(message: Option<&str>, error: Option<&str>) -> ErrorResponse {
    ApiResponse::failure(
        message.unwrap_or(messages::UNAUTHORIZED),
        StatusCode::UNAUTHORIZED,
        error,
    )
}

pub fn forbidden(message: Option<&str>, error: Option<&str>) -> ErrorResponse {
    ApiResponse::failure(
        message.unwrap_or(messages::FORBIDDEN),
        StatusCode::FORBIDDEN,
        error,
    )
}

pub fn not_found(message: Option<&str>, error: Option<&str>) -> ErrorResponse {
    ApiResponse::failure(
        message.unwrap_or(messages::NOT_FOUND),
        StatusCode::NOT_FOUND,
        error,
    )
}

pub fn conflict(message: Option<&str>, error: Option<&str>) -> ErrorResponse {
    ApiResponse::failure(
        message.unwrap_or(messages::CONFLICT),
        StatusCode::CONFLICT,
        error,
    )
}

pub fn validation_error(message: Option<&str>, error: Option<&str>) -> ErrorResponse {
    ApiResponse::failure(
        message.unwrap_or(messages::VALIDATION_ERROR),
        StatusCode::UNPROCESSABLE_ENTITY,
        error,
    )
}

pub fn internal_error(message: Option<&str>, error: Option<&str>) -> ErrorResponse {
    ApiResponse::failure(
        message.unwrap_or(messages::INTERNAL_ERROR),
        StatusCode::INTERNAL_SERVER_ERROR,
        error,
    )
}

pub fn email_exists() -> ErrorResponse {
    ApiResponse::failure(messages::EMAIL_EXISTS, StatusCode::CONFLICT, None)
}

pub fn username_exists() -> ErrorResponse {
    ApiResponse::failure(messages::USERNAME_EXISTS, StatusCode::CONFLICT, None)
}

pub fn missing_fields() -> ErrorResponse {
    ApiResponse::failure(messages::MISSING_FIELDS, StatusCode::BAD_REQUEST, None)
}

pub fn invalid_format() -> ErrorResponse {
    ApiResponse::failure(messages::INVALID_FORMAT, StatusCode::BAD_REQUEST, None)
}
