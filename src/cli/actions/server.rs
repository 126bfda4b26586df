use crate::api::{self, handlers::auth::AuthConfig};
use anyhow::Result;
use secrecy::SecretString;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub session_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub session_cookie_secure: bool,
    pub cors_allow_origin: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the auth configuration is invalid, the database is
/// unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let auth_config = AuthConfig::new(args.session_secret)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_cookie_secure(args.session_cookie_secure);

    api::new(args.port, args.dsn, auth_config, args.cors_allow_origin).await
}

fn log_startup_args(args: &Args) {
    info!(
        port = args.port,
        dsn = %redact_dsn(&args.dsn),
        session_ttl_seconds = args.session_ttl_seconds,
        session_cookie_secure = args.session_cookie_secure,
        cors_allow_origin = args.cors_allow_origin.as_deref().unwrap_or("*"),
        "Starting umbral"
    );
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => "<invalid dsn>".to_string(),
    }
}
