//! # Umbral (credential sign-in and bootstrap registration)
//!
//! `umbral` is the authentication slice of a web application. It verifies
//! email/password credentials, issues signed stateless session tokens, guards
//! routes based on session presence and exposes a one-time registration
//! endpoint for the very first account.
//!
//! ## Sessions
//!
//! Sessions are HS256 JWTs carried in the `umbral_session` cookie (or a bearer
//! header). Nothing is stored server-side; every request re-verifies the
//! signature and expiry. The role claim is captured at sign-in and is not
//! re-fetched, so role changes only take effect after signing in again.
//!
//! ## Bootstrap Registration
//!
//! `POST /api/auth/register` only succeeds while the user store is empty. The
//! final check runs inside a transaction holding an advisory lock, so two
//! concurrent first registrations cannot both win.
//!
//! ## Response Envelope
//!
//! Every API response, success or failure, is rendered as
//! `{success, status, message, data?, error?, timestamp}`.

pub mod api;
pub mod cli;
pub mod client;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
