use axum::{body::Bytes, extract::Extension, response::IntoResponse};
use std::sync::Arc;
use tracing::instrument;

use super::{
    schema::validate_register,
    service,
    state::AuthState,
    types::{RegisterRequest, RegisterResponse},
};
use crate::{
    api::{
        error::ApiError,
        response::{self, messages},
    },
    store::UserStore,
};

/// One-time bootstrap registration.
///
/// The open/closed gate runs before the body is read, so once an account
/// exists every request gets 403 whatever it carries.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "First account created", body = RegisterResponse),
        (status = 400, description = "Missing fields or malformed JSON"),
        (status = 403, description = "Registration is closed"),
        (status = 409, description = "Email or username already exists"),
        (status = 422, description = "Input failed validation")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    store: Extension<Arc<dyn UserStore>>,
    auth_state: Extension<Arc<AuthState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    service::ensure_registration_open(store.as_ref()).await?;

    let request: RegisterRequest = serde_json::from_slice(&body)?;
    let input = request.into_input().ok_or(ApiError::MissingFields)?;
    validate_register(&input)?;

    let created = service::register(store.as_ref(), auth_state.hasher(), input).await?;

    let data = RegisterResponse {
        user_id: created.id,
        user_name: created.user_name,
    };
    Ok(response::created(data, Some(messages::REGISTER_SUCCESS)))
}
