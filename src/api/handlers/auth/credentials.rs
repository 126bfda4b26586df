use axum::{
    body::Bytes,
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    schema::valid_credentials_shape,
    service,
    session::session_cookie,
    state::AuthState,
    types::{CredentialsRequest, Identity},
};
use crate::{
    api::{
        error::ApiError,
        response::{self, messages},
    },
    store::UserStore,
};

#[utoipa::path(
    post,
    path = "/api/auth/callback/credentials",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = Identity),
        (status = 400, description = "Body is not JSON"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn sign_in(
    store: Extension<Arc<dyn UserStore>>,
    auth_state: Extension<Arc<AuthState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: CredentialsRequest = serde_json::from_slice(&body)?;

    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(ApiError::InvalidCredentials);
    };
    if !valid_credentials_shape(&email, &password) {
        return Err(ApiError::InvalidCredentials);
    }

    let identity =
        service::authenticate(store.as_ref(), auth_state.hasher(), &email, &password).await?;

    let token = auth_state
        .keys()
        .issue(&identity, auth_state.config().session_ttl_seconds())
        .map_err(|e| ApiError::Internal(e.into()))?;
    let cookie =
        session_cookie(auth_state.config(), &token).map_err(|e| ApiError::Internal(e.into()))?;

    info!(user_id = %identity.id, "Signed in");

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((headers, response::ok(identity, Some(messages::LOGIN_SUCCESS))))
}
