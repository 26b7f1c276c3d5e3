//! Raw HTTP transport boundary.
//!
//! The client core consumes the actual socket/TLS/JSON machinery through
//! the minimal [`HttpTransport`] contract; [`ReqwestTransport`] is the
//! production implementation.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// A raw transport response: status code plus decoded JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    code: u16,
    body: Value,
}

impl Response {
    /// Create a response.
    pub fn new(code: u16, body: Value) -> Self {
        Self { code, body }
    }

    /// The HTTP status code.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The decoded body.
    pub fn body(&self) -> &Value {
        &self.body
    }
}

/// The assembled pieces of one request: the versioned url with its query
/// string, the JSON body and the headers.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParts {
    url: String,
    body: Value,
    headers: Vec<(String, String)>,
}

impl RequestParts {
    /// Create request parts.
    pub fn new(url: String, body: Value, headers: Vec<(String, String)>) -> Self {
        Self { url, body, headers }
    }

    /// The url path including its query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The JSON body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The request headers.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// Build the versioned url path with its query string.
///
/// The version and path are joined with single slashes regardless of how
/// callers spell them; query parameters are appended in the given order.
pub fn build_url(version: &str, url: &str, query: &[(String, String)]) -> String {
    let version = version.trim_matches('/');
    let url = url.trim_matches('/');
    let path = format!("/{version}/{url}");
    let path = path.trim_end_matches('/');

    let params: Vec<String> = query
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();

    format!("{path}?{}", params.join("&"))
}

/// Minimal raw transport contract consumed by the client core.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Dispatch one request and return the decoded response.
    async fn send(&self, method: &str, parts: &RequestParts) -> Result<Response>;
}

/// Production transport backed by a reqwest client.
pub struct ReqwestTransport {
    client: reqwest::Client,
    host: String,
}

impl ReqwestTransport {
    /// Create a transport against `host` with the given timeouts.
    pub fn new(
        host: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ClientError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
        })
    }

    /// The configured host.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("host", &self.host)
            .finish()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, method: &str, parts: &RequestParts) -> Result<Response> {
        let method = reqwest::Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| ClientError::transport(format!("invalid HTTP method: {method}")))?;

        let url = format!("{}{}", self.host, parts.url());
        let mut request = self.client.request(method, &url).json(parts.body());
        for (key, value) in parts.headers() {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        let code = response.status().as_u16();
        // Error bodies are not always JSON; surface the status either way.
        let body = response.json().await.unwrap_or(Value::Null);

        Ok(Response::new(code, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_normalizes_slashes() {
        let query = vec![("app_id".to_string(), "a1".to_string())];
        assert_eq!(build_url("v1", "/items", &query), "/v1/items?app_id=a1");
        assert_eq!(build_url("/v1/", "items/", &query), "/v1/items?app_id=a1");
    }

    #[test]
    fn test_build_url_keeps_parameter_order() {
        let query = vec![
            ("app_id".to_string(), "a1".to_string()),
            ("index".to_string(), "main".to_string()),
            ("token".to_string(), "t0".to_string()),
        ];
        assert_eq!(
            build_url("v1", "/", &query),
            "/v1?app_id=a1&index=main&token=t0"
        );
    }
}
