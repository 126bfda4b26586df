//! Auth configuration and the shared state handed to handlers.

use anyhow::{anyhow, bail, Result};
use argon2::Params;
use secrecy::{ExposeSecret, SecretString};

use super::{password::CredentialHasher, token::SessionKeys};

/// Thirty days.
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
/// Five years.
pub const MAX_SESSION_TTL_SECONDS: i64 = 5 * 365 * 24 * 60 * 60;
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_secret: SecretString,
    session_ttl_seconds: i64,
    session_cookie_secure: bool,
    password_params: Params,
}

impl AuthConfig {
    #[must_use]
    pub fn new(session_secret: SecretString) -> Self {
        Self {
            session_secret,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            password_params: Params::default(),
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_password_params(mut self, params: Params) -> Self {
        self.password_params = params;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }
}

pub struct AuthState {
    config: AuthConfig,
    keys: SessionKeys,
    hasher: CredentialHasher,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the secret is too short, the TTL is outside
    /// `1..=MAX_SESSION_TTL_SECONDS` or the password parameters are rejected.
    pub fn new(config: AuthConfig) -> Result<Self> {
        let secret = config.session_secret.expose_secret();
        if secret.len() < MIN_SESSION_SECRET_LEN {
            bail!("session secret must be at least {MIN_SESSION_SECRET_LEN} bytes");
        }
        if !(1..=MAX_SESSION_TTL_SECONDS).contains(&config.session_ttl_seconds) {
            bail!("session TTL must be between 1 and {MAX_SESSION_TTL_SECONDS} seconds");
        }
        let keys = SessionKeys::new(secret.as_bytes());
        let hasher = CredentialHasher::new(config.password_params.clone())
            .map_err(|e| anyhow!("invalid password hashing parameters: {e}"))?;
        Ok(Self {
            config,
            keys,
            hasher,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    #[must_use]
    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("session_ttl_seconds", &self.config.session_ttl_seconds)
            .field("session_cookie_secure", &self.config.session_cookie_secure)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AuthState {
    AuthState {
        config: AuthConfig::new(SecretString::from(TEST_SECRET.to_string())),
        keys: SessionKeys::new(TEST_SECRET.as_bytes()),
        hasher: super::password::test_hasher(),
    }
}

#[cfg(test)]
pub(crate) const TEST_SECRET: &str = "test-secret-key-for-testing-only-0123456789";
