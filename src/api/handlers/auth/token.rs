//! Signed stateless session tokens (HS256 JWT).

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::Identity;

/// Claims carried by a session token.
///
/// The role is frozen at sign-in; it is not re-read from the store when the
/// token is presented later.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq, Eq)]
pub struct SessionClaims {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("session TTL of {0}s puts the expiry out of range")]
    TtlOutOfRange(i64),
    #[error(transparent)]
    Encode(#[from] jsonwebtoken::errors::Error),
}

pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Issue a token for an authenticated identity.
    ///
    /// # Errors
    /// Returns an error if `now + ttl_seconds` is not a representable time or
    /// the claims cannot be encoded.
    pub fn issue(&self, identity: &Identity, ttl_seconds: i64) -> Result<String, IssueError> {
        let now = Utc::now();
        let exp = TimeDelta::try_seconds(ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(IssueError::TtlOutOfRange(ttl_seconds))?;

        let claims = SessionClaims {
            id: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify signature and expiry and return the claims.
    ///
    /// # Errors
    /// Returns an error for malformed, tampered or expired tokens.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}
