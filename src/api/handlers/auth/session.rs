//! Session cookie handling and the session/sign-out endpoints.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::debug;

use super::{
    state::{AuthConfig, AuthState},
    token::SessionClaims,
};
use crate::api::{
    error::ApiError,
    response::{self, messages},
};

pub const SESSION_COOKIE_NAME: &str = "umbral_session";

/// Verified session attached to every request that passes the route guard.
#[derive(Clone, Debug, Default)]
pub struct CurrentSession(pub Option<SessionClaims>);

impl CurrentSession {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

/// Resolve the request's session token into claims.
///
/// Missing, malformed, tampered and expired tokens all resolve to `None`.
pub fn resolve_session(headers: &HeaderMap, auth_state: &AuthState) -> Option<SessionClaims> {
    let token = extract_session_token(headers)?;
    match auth_state.keys().verify(&token) {
        Ok(claims) => Some(claims),
        Err(err) => {
            debug!("Ignoring session token: {err}");
            None
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session claims in the response envelope", body = SessionClaims),
        (status = 401, description = "No valid session")
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = resolve_session(&headers, &auth_state).ok_or(ApiError::Unauthorized)?;
    Ok(response::ok(claims, None))
}

#[utoipa::path(
    post,
    path = "/api/auth/signout",
    responses(
        (status = 200, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn signout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Stateless tokens: clearing the cookie is all there is to do.
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(auth_state.config()) {
        headers.insert(SET_COOKIE, cookie);
    }
    (headers, response::ok((), Some(messages::LOGOUT_SUCCESS)))
}

pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Bearer header first, then the session cookie.
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    // Browsers may send several Cookie headers over HTTP/2.
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty() {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
