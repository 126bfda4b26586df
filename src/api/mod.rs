//! HTTP surface: router assembly, middleware stack and server startup.

use crate::store::{PgStore, UserStore};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub mod guard;
pub mod handlers;
mod openapi;
pub mod response;


pub use openapi::openapi;

use handlers::{auth, health, root};

/// Build the application router.
///
/// Everything except `/health` and the documentation routes sits behind the
/// route guard, including the 404 fallback.
///
/// # Errors
/// Returns an error if `cors_allow_origin` is not a valid header value.
pub fn app(
    store: Arc<dyn UserStore>,
    auth_state: Arc<auth::AuthState>,
    cors_allow_origin: Option<&str>,
) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(allow_origin(cors_allow_origin)?);

    let guarded = Router::new()
        .route("/", get(root::root))
        .route("/dashboard", get(root::dashboard))
        .route("/api/auth/register", post(auth::register::register))
        .route(
            "/api/auth/callback/credentials",
            post(auth::credentials::sign_in),
        )
        .route("/api/auth/session", get(auth::session::session))
        .route("/api/auth/signout", post(auth::session::signout))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            guard::route_guard,
        ));

    let app = guarded
        .route("/health", get(health::health).options(health::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(CatchPanicLayer::custom(error::panic_response))
                .layer(Extension(auth_state))
                .layer(Extension(store)),
        );

    Ok(app)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    dsn: String,
    auth_config: auth::AuthConfig,
    cors_allow_origin: Option<String>,
) -> Result<()> {
    let auth_state = Arc::new(auth::AuthState::new(auth_config)?);

    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store: Arc<dyn UserStore> = Arc::new(PgStore::new(pool));

    let app = app(store, auth_state, cors_allow_origin.as_deref())?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

async fn not_found() -> impl IntoResponse {
    response::not_found(None, None)
}

fn allow_origin(origin: Option<&str>) -> Result<AllowOrigin> {
    match origin.map(str::trim) {
        None | Some("" | "*") => Ok(AllowOrigin::from(Any)),
        Some(origin) => {
            let value = HeaderValue::from_str(origin.trim_end_matches('/'))
                .with_context(|| format!("Invalid CORS origin: {origin}"))?;
            Ok(AllowOrigin::exact(value))
        }
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
