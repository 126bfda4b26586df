use super::{ClientError, HttpClient};
use crate::api::{
    handlers::auth::{CredentialsRequest, Identity, RegisterRequest, RegisterResponse, SessionClaims},
    response::ApiResponse,
};
use serde_json::Value;

/// Typed calls for the `/auth` endpoints.
///
/// The underlying client keeps a cookie jar, so a successful [`sign_in`]
/// authenticates the following [`session`] and [`sign_out`] calls.
///
/// [`sign_in`]: AuthClient::sign_in
/// [`session`]: AuthClient::session
/// [`sign_out`]: AuthClient::sign_out
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: HttpClient,
}

impl AuthClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<ApiResponse<RegisterResponse>, ClientError> {
        let body = RegisterRequest {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        self.http.post("/auth/register", Some(&body), None).await
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ApiResponse<Identity>, ClientError> {
        let body = CredentialsRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        self.http
            .post("/auth/callback/credentials", Some(&body), None)
            .await
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn session(&self) -> Result<ApiResponse<SessionClaims>, ClientError> {
        self.http.get("/auth/session", None).await
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn sign_out(&self) -> Result<ApiResponse<Value>, ClientError> {
        self.http.post::<Value, ()>("/auth/signout", None, None).await
    }
}
