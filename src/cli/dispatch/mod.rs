//! Map validated CLI arguments to an action.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::{anyhow, Context, Result};
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or the DSN is not a
/// Postgres URL.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let parsed = Url::parse(&dsn).context("invalid --dsn")?;
    if !matches!(parsed.scheme(), "postgres" | "postgresql") {
        return Err(anyhow!("--dsn must be a postgres:// URL"));
    }

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        session_secret: auth_opts.session_secret,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        session_cookie_secure: auth_opts.session_cookie_secure,
        cors_allow_origin: auth_opts.cors_allow_origin,
    }))
}
