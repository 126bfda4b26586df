//! End-to-end tests for the umbral HTTP surface.
//!
//! Each test binds the real router to an ephemeral local port, backed by the
//! in-memory user store, and drives it through the bundled HTTP client so the
//! cookie jar, the route guard and the response envelope are exercised the
//! way a browser-side caller would see them.

use anyhow::{Context, Result};
use argon2::Params;
use secrecy::SecretString;
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, task::JoinHandle};
use umbral::{
    api::{
        self,
        handlers::auth::{AuthConfig, AuthState},
        response::messages,
    },
    client::{AuthClient, ClientOptions, HttpClient},
    store::{MemoryStore, UserStore},
};

const SECRET: &str = "integration-secret-integration-secret";
const PASSWORD: &str = "Str0ngPassw0rd";

struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Result<Self> {
        let params = Params::new(8, 1, 1, None).map_err(|e| anyhow::anyhow!("{e}"))?;
        let config = AuthConfig::new(SecretString::from(SECRET.to_string()))
            .with_session_ttl_seconds(3600)
            .with_password_params(params);
        let auth_state = Arc::new(AuthState::new(config)?);
        let store: Arc<dyn UserStore> = Arc::new(MemoryStore::new());

        let app = api::app(store, auth_state, None)?;
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });

        Ok(Self { addr, handle })
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    fn client(&self) -> Result<AuthClient> {
        let http = HttpClient::with_options(ClientOptions {
            base_url: Some(self.url("/api")),
            ..ClientOptions::default()
        })
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
        Ok(AuthClient::new(http))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn bootstrap_sign_in_and_sign_out() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;

    let registered = client
        .register("Ada", "Lovelace", "ada@example.com", PASSWORD)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
    assert!(registered.success);
    assert_eq!(registered.status, 201);
    assert_eq!(registered.message, messages::REGISTER_SUCCESS);
    let created = registered.data.context("missing registration data")?;
    assert_eq!(created.user_name, "ADA LOVELACE");

    let signed_in = client
        .sign_in("ada@example.com", PASSWORD)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
    assert!(signed_in.success);
    assert_eq!(signed_in.message, messages::LOGIN_SUCCESS);
    let identity = signed_in.data.context("missing identity")?;
    assert_eq!(identity.id, created.user_id);
    assert_eq!(identity.email, "ada@example.com");
    assert_eq!(identity.role, "user");

    // The cookie jar now carries the session.
    let session = client
        .session()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
    assert!(session.success);
    let claims = session.data.context("missing claims")?;
    assert_eq!(claims.id, created.user_id);
    assert_eq!(claims.role, "user");

    let dashboard = client
        .http()
        .get::<Value>(&server.url("/dashboard"), None)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
    assert_eq!(dashboard.status, 200);

    let signed_out = client
        .sign_out()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
    assert_eq!(signed_out.message, messages::LOGOUT_SUCCESS);

    let session = client
        .session()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
    assert!(!session.success);
    assert_eq!(session.status, 401);
    Ok(())
}

#[tokio::test]
async fn second_registration_is_forbidden() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;

    let first = client
        .register("Ada", "Lovelace", "ada@example.com", PASSWORD)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
    assert!(first.success);

    let second = client
        .register("Grace", "Hopper", "grace@example.com", PASSWORD)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
    assert!(!second.success);
    assert_eq!(second.status, 403);
    assert_eq!(second.message, "Registration is not allowed.");
    Ok(())
}

#[tokio::test]
async fn failed_sign_in_does_not_reveal_which_part_was_wrong() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;
    client
        .register("Ada", "Lovelace", "ada@example.com", PASSWORD)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;

    let wrong_password = client
        .sign_in("ada@example.com", "Wr0ngPassword")
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
    let unknown_email = client
        .sign_in("nobody@example.com", PASSWORD)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;

    for response in [&wrong_password, &unknown_email] {
        assert!(!response.success);
        assert_eq!(response.status, 401);
        assert_eq!(response.message, messages::INVALID_CREDENTIALS);
        assert!(response.data.is_none());
    }
    assert_eq!(wrong_password.error, unknown_email.error);
    Ok(())
}

#[tokio::test]
async fn anonymous_dashboard_visit_lands_on_login() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;

    // reqwest follows the redirect; there is no login page, so the guard lets
    // the request through to the 404 envelope.
    let response = client
        .http()
        .get::<Value>(&server.url("/dashboard"), None)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;
    assert!(!response.success);
    assert_eq!(response.status, 404);

    let health = reqwest::get(server.url("/health")).await?;
    assert_eq!(health.status(), reqwest::StatusCode::OK);
    assert!(health.headers().contains_key("x-request-id"));
    Ok(())
}
