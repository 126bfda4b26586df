//! Landing resources on either side of the route guard.

use axum::{extract::Extension, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

use super::auth::{CurrentSession, SessionClaims};
use crate::api::{error::ApiError, response};

#[derive(ToSchema, Serialize, Debug)]
pub struct Root {
    name: String,
    version: String,
    authenticated: bool,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Public landing resource", body = Root)
    ),
    tag = "root"
)]
pub async fn root(session: Option<Extension<CurrentSession>>) -> impl IntoResponse {
    let authenticated = session.is_some_and(|Extension(s)| s.is_authenticated());
    response::ok(
        Root {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            authenticated,
        },
        None,
    )
}

/// Where signed-in users land. Anonymous requests never get here because the
/// guard redirects them to `/login` first.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Caller's session", body = SessionClaims),
        (status = 307, description = "Redirect to /login without a session")
    ),
    tag = "root"
)]
pub async fn dashboard(
    session: Option<Extension<CurrentSession>>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = session
        .and_then(|Extension(CurrentSession(claims))| claims)
        .ok_or(ApiError::Unauthorized)?;
    Ok(response::ok(claims, None))
}
