//! Request and response payloads for the auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Registration body. Every field is optional at the wire level so a missing
/// field is reported as `MissingFields` instead of a parse failure.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration input once all four fields are present and non-empty.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// `None` when any field is absent or empty.
    #[must_use]
    pub fn into_input(self) -> Option<RegisterInput> {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        Some(RegisterInput {
            first_name: present(self.first_name)?,
            last_name: present(self.last_name)?,
            email: present(self.email)?,
            password: present(self.password)?,
        })
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub user_name: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Minimal identity returned by a successful sign-in.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}
