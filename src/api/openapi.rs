#![allow(clippy::needless_for_each)]

use super::handlers::{auth, health, root};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        root::root,
        root::dashboard,
        auth::register::register,
        auth::credentials::sign_in,
        auth::session::session,
        auth::session::signout,
    ),
    components(schemas(
        health::Health,
        root::Root,
        auth::RegisterRequest,
        auth::RegisterResponse,
        auth::CredentialsRequest,
        auth::Identity,
        auth::SessionClaims,
    )),
    tags(
        (name = "auth", description = "Credential sign-in, sessions and bootstrap registration"),
        (name = "health", description = "Liveness and database status"),
        (name = "root", description = "Landing resources")
    ),
    info(
        title = "umbral",
        description = "All JSON responses are wrapped in `{success, status, message, data?, error?, timestamp}`; the schemas below describe `data`."
    )
)]
pub(super) struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
