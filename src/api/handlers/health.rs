use crate::{store::UserStore, GIT_COMMIT_HASH};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
    /// `open` until the first account exists, `closed` afterwards, `unknown`
    /// when the store could not be queried.
    registration: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "User store is reachable", body = [Health]),
        (status = 503, description = "User store is unreachable", body = [Health])
    ),
    tag= "health"
)]
pub async fn health(method: Method, store: Extension<Arc<dyn UserStore>>) -> impl IntoResponse {
    let healthy = match store.ping().await {
        Ok(()) => true,
        Err(err) => {
            error!("Failed to ping user store: {err:#}");
            false
        }
    };

    let registration = if healthy {
        match store.count_users().await {
            Ok(0) => "open",
            Ok(_) => "closed",
            Err(err) => {
                error!("Failed to count users: {err:#}");
                "unknown"
            }
        }
    } else {
        "unknown"
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if healthy { "ok" } else { "error" }.to_string(),
        registration: registration.to_string(),
    };
    debug!(database = %health.database, registration, "Health check");

    let headers = x_app_headers(&health);
    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, headers, body)
}

// name:version:short-commit
fn x_app_headers(health: &Health) -> HeaderMap {
    let short_hash = health.commit.get(0..7).unwrap_or(&health.commit);
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&format!("{}:{}:{short_hash}", health.name, health.version)) {
        Ok(value) => {
            headers.insert("X-App", value);
        }
        Err(err) => error!("Failed to build X-App header: {err}"),
    }
    headers
}
