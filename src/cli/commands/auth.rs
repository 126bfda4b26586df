use crate::api::handlers::auth::{MAX_SESSION_TTL_SECONDS, MIN_SESSION_SECRET_LEN};
use anyhow::{anyhow, Context, Result};
use clap::{builder::ValueParser, Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";
pub const ARG_CORS_ALLOW_ORIGIN: &str = "cors-allow-origin";

// Thirty days, matching the handler default.
const DEFAULT_SESSION_TTL: &str = "2592000";

fn validator_session_secret() -> ValueParser {
    ValueParser::from(move |secret: &str| -> std::result::Result<String, String> {
        if secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(format!(
                "session secret must be at least {MIN_SESSION_SECRET_LEN} bytes"
            ));
        }
        Ok(secret.to_string())
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_session_args(command);
    with_cors_args(command)
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign session tokens (at least 32 bytes)")
                .env("UMBRAL_SESSION_SECRET")
                .hide_env_values(true)
                .required(true)
                .value_parser(validator_session_secret()),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session token and cookie lifetime in seconds (at most five years)")
                .env("UMBRAL_SESSION_TTL_SECONDS")
                .default_value(DEFAULT_SESSION_TTL)
                .value_parser(clap::value_parser!(i64).range(1..=MAX_SESSION_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long(ARG_SESSION_COOKIE_SECURE)
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("UMBRAL_SESSION_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}

fn with_cors_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_CORS_ALLOW_ORIGIN)
            .long(ARG_CORS_ALLOW_ORIGIN)
            .help("Allowed CORS origin, `*` for any")
            .env("UMBRAL_CORS_ALLOW_ORIGIN")
            .default_value("*"),
    )
}

#[derive(Debug)]
pub struct Options {
    pub session_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub session_cookie_secure: bool,
    pub cors_allow_origin: Option<String>,
}

impl Options {
    /// # Errors
    /// Returns an error if the session secret is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let session_secret = matches
            .get_one::<String>(ARG_SESSION_SECRET)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --session-secret")?;
        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .ok_or_else(|| anyhow!("missing argument: --{ARG_SESSION_TTL_SECONDS}"))?;
        let cors_allow_origin = matches
            .get_one::<String>(ARG_CORS_ALLOW_ORIGIN)
            .filter(|origin| origin.as_str() != "*")
            .cloned();

        Ok(Self {
            session_secret,
            session_ttl_seconds,
            session_cookie_secure: matches.get_flag(ARG_SESSION_COOKIE_SECURE),
            cors_allow_origin,
        })
    }
}
