//! Credential sign-in, sessions and bootstrap registration.
//!
//! ## Sessions
//!
//! A successful sign-in issues an HS256 token carrying `{id, name, email,
//! role}` and sets it as the `umbral_session` cookie (`HttpOnly`,
//! `SameSite=Lax`, `Secure` when configured). The same token is accepted as a
//! bearer header. Nothing is persisted; sign-out only clears the cookie.
//!
//! ## Bootstrap Registration
//!
//! Registration is open only while no account exists. The handler checks the
//! count up front and the store re-checks under a lock while writing, so a
//! losing concurrent request gets 403 as well.

pub(crate) mod credentials;
mod password;
pub(crate) mod register;
mod schema;
pub(crate) mod service;
pub(crate) mod session;
mod state;
mod token;
pub(crate) mod types;

pub use password::CredentialHasher;
pub use session::{resolve_session, CurrentSession, SESSION_COOKIE_NAME};
pub use state::{
    AuthConfig, AuthState, DEFAULT_SESSION_TTL_SECONDS, MAX_SESSION_TTL_SECONDS,
    MIN_SESSION_SECRET_LEN,
};
pub use token::{IssueError, SessionClaims, SessionKeys};
pub use types::{CredentialsRequest, Identity, RegisterRequest, RegisterResponse};

#[cfg(test)]
pub(crate) use state::{test_state, TEST_SECRET};
