//! Outbound HTTP client for the envelope-shaped API.
//!
//! Every call resolves to an [`ApiResponse`] whatever the HTTP status, so
//! callers branch on `success` instead of on transport errors. A
//! [`ClientError`] means the request never produced an envelope: the server
//! was unreachable, timed out, or answered with something that is not one.

mod auth;

pub use auth::AuthClient;

use crate::{api::response::ApiResponse, APP_USER_AGENT};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client, Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{fmt::Display, time::Duration};
use thiserror::Error;
use tracing::{debug, instrument};

pub const API_URL_ENV: &str = "UMBRAL_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure that produced no decodable envelope.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
    pub status: Option<u16>,
    pub code: Option<String>,
    pub details: Option<Value>,
}

impl ClientError {
    fn new(message: impl Into<String>, code: &str) -> Self {
        Self {
            message: message.into(),
            status: None,
            code: Some(code.to_string()),
            details: None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_decode() {
            "decode"
        } else if err.is_builder() {
            "builder"
        } else {
            "request"
        };
        Self {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
            code: Some(code.to_string()),
            details: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
}

/// Per-request overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl PaginationParams {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            query.push(("sortBy".to_string(), sort_by.clone()));
        }
        if let Some(order) = self.sort_order {
            let order = match order {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            };
            query.push(("sortOrder".to_string(), order.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    default_headers: HeaderMap,
    timeout: Duration,
}

impl HttpClient {
    /// Client for `UMBRAL_API_URL`, or the local default when unset.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_options(ClientOptions::default())
    }

    /// # Errors
    /// Returns an error if a header is invalid or the HTTP client cannot be built.
    pub fn with_options(options: ClientOptions) -> Result<Self, ClientError> {
        let base_url = options
            .base_url
            .or_else(|| std::env::var(API_URL_ENV).ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_store(true)
            .build()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        insert_headers(&mut default_headers, &options.headers)?;

        Ok(Self {
            client,
            base_url,
            default_headers,
            timeout: options.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    /// Merge into the default headers; existing names are overwritten.
    ///
    /// # Errors
    /// Returns an error if a name or value is not a valid header.
    pub fn set_default_headers(&mut self, headers: &[(String, String)]) -> Result<(), ClientError> {
        insert_headers(&mut self.default_headers, headers)
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<RequestBuilder, ClientError> {
        let mut headers = self.default_headers.clone();
        let mut timeout = self.timeout;
        let mut request = self.client.request(method, self.url_for(path));
        if let Some(config) = config {
            insert_headers(&mut headers, &config.headers)?;
            if !config.params.is_empty() {
                request = request.query(&config.params);
            }
            if let Some(t) = config.timeout {
                timeout = t;
            }
        }
        Ok(request.headers(headers).timeout(timeout))
    }

    #[instrument(skip(self, body, config), fields(url = %self.url_for(path)))]
    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.build(method, path, config)?;
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), "API response");

        decode_envelope(status.as_u16(), &bytes)
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.request::<T, ()>(Method::GET, path, None, config).await
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn post<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, body, config).await
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn put<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, body, config).await
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn patch<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, body, config).await
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.request::<T, ()>(Method::DELETE, path, None, config).await
    }

    /// `GET {endpoint}/{id}`
    ///
    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn get_by_id<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        id: impl Display,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.get(&format!("{endpoint}/{id}"), None).await
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Option<&PaginationParams>,
    ) -> Result<ApiResponse<PaginatedResponse<T>>, ClientError> {
        let config = params.map(|p| RequestConfig {
            params: p.to_query(),
            ..RequestConfig::default()
        });
        self.get(endpoint, config.as_ref()).await
    }

    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn create<T, B>(&self, endpoint: &str, data: &B) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(endpoint, Some(data), None).await
    }

    /// `PUT {endpoint}/{id}`
    ///
    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn update<T, B>(
        &self,
        endpoint: &str,
        id: impl Display,
        data: &B,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put(&format!("{endpoint}/{id}"), Some(data), None).await
    }

    /// `DELETE {endpoint}/{id}`
    ///
    /// # Errors
    /// Transport failures and non-envelope responses.
    pub async fn remove<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        id: impl Display,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.delete(&format!("{endpoint}/{id}"), None).await
    }
}

fn insert_headers(target: &mut HeaderMap, headers: &[(String, String)]) -> Result<(), ClientError> {
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::new(format!("invalid header name {name}: {e}"), "header"))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::new(format!("invalid header value: {e}"), "header"))?;
        target.insert(name, value);
    }
    Ok(())
}

/// Decode an envelope whatever the status; failure envelopes carry no `data`.
fn decode_envelope<T: DeserializeOwned>(
    status: u16,
    bytes: &[u8],
) -> Result<ApiResponse<T>, ClientError> {
    serde_json::from_slice::<ApiResponse<T>>(bytes).map_err(|err| {
        let details = serde_json::from_slice::<Value>(bytes).ok();
        let message = details
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .map_or_else(|| format!("unexpected response: {err}"), str::to_string);
        ClientError {
            message,
            status: Some(status),
            code: Some("decode".to_string()),
            details,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> Result<HttpClient, ClientError> {
        HttpClient::with_options(ClientOptions {
            base_url: Some(base.to_string()),
            ..ClientOptions::default()
        })
    }

    #[test]
    fn joins_paths_like_a_base_url() -> Result<(), ClientError> {
        let client = client("http://localhost:8080/api/")?;
        assert_eq!(client.url_for("/auth/register"), "http://localhost:8080/api/auth/register");
        assert_eq!(client.url_for("auth/session"), "http://localhost:8080/api/auth/session");
        assert_eq!(client.url_for(""), "http://localhost:8080/api");
        assert_eq!(client.url_for("https://other.test/x"), "https://other.test/x");
        Ok(())
    }

    #[test]
    fn base_url_from_env_or_default() {
        temp_env::with_var(API_URL_ENV, Some("http://api.test/v1"), || {
            let client = HttpClient::new();
            assert_eq!(client.map(|c| c.base_url().to_string()).ok().as_deref(), Some("http://api.test/v1"));
        });
        temp_env::with_var_unset(API_URL_ENV, || {
            let client = HttpClient::new();
            assert_eq!(client.map(|c| c.base_url().to_string()).ok().as_deref(), Some(DEFAULT_API_URL));
        });
    }

    #[test]
    fn set_base_url_and_headers() -> Result<(), ClientError> {
        let mut client = client("http://a.test")?;
        client.set_base_url("http://b.test");
        assert_eq!(client.url_for("x"), "http://b.test/x");

        client.set_default_headers(&[("X-Trace".to_string(), "1".to_string())])?;
        assert_eq!(client.default_headers.get("x-trace").map(|v| v.as_bytes()), Some(&b"1"[..]));
        assert!(client.default_headers.contains_key(CONTENT_TYPE));

        let bad = client.set_default_headers(&[("bad header".to_string(), "x".to_string())]);
        assert_eq!(bad.err().and_then(|e| e.code).as_deref(), Some("header"));
        Ok(())
    }

    #[test]
    fn pagination_query() {
        let params = PaginationParams {
            page: Some(2),
            limit: Some(10),
            sort_by: Some("createdAt".to_string()),
            sort_order: Some(SortOrder::Desc),
        };
        assert_eq!(
            params.to_query(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("sortBy".to_string(), "createdAt".to_string()),
                ("sortOrder".to_string(), "desc".to_string()),
            ]
        );
        assert!(PaginationParams::default().to_query().is_empty());
    }

    #[tokio::test]
    async fn unreachable_server_is_a_client_error() -> Result<(), ClientError> {
        // Port 9 (discard) is closed on test hosts.
        let client = HttpClient::with_options(ClientOptions {
            base_url: Some("http://127.0.0.1:9".to_string()),
            timeout: Some(Duration::from_secs(2)),
            ..ClientOptions::default()
        })?;
        let err = client.get::<Value>("/anything", None).await;
        let Err(err) = err else {
            panic!("expected a transport error");
        };
        assert!(err.status.is_none());
        assert!(!err.message.is_empty());
        Ok(())
    }

    #[test]
    fn decodes_failure_envelope_without_data() -> Result<(), ClientError> {
        use crate::api::handlers::auth::Identity;

        let body = br#"{
            "success": false,
            "status": 401,
            "message": "Invalid credentials",
            "error": "Invalid credentials",
            "timestamp": "2026-01-01T00:00:00.000Z"
        }"#;
        let envelope = decode_envelope::<Identity>(401, body)?;
        assert!(!envelope.success);
        assert_eq!(envelope.status, 401);
        assert_eq!(envelope.message, "Invalid credentials");
        assert!(envelope.data.is_none());
        Ok(())
    }

    #[test]
    fn non_envelope_body_keeps_status_and_message() {
        let result = decode_envelope::<Value>(502, br#"{"message":"bad gateway"}"#);
        let Err(err) = result else {
            panic!("expected a decode error");
        };
        assert_eq!(err.status, Some(502));
        assert_eq!(err.code.as_deref(), Some("decode"));
        assert_eq!(err.message, "bad gateway");

        let result = decode_envelope::<Value>(500, b"<html>oops</html>");
        let Err(err) = result else {
            panic!("expected a decode error");
        };
        assert!(err.details.is_none());
        assert!(err.message.starts_with("unexpected response"));
    }
}
