//! The transport client: path versioning, response caching, retry-policy
//! lookup and overlapping-query cancellation.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

use crate::cache::{NoCache, ResponseCache};
use crate::error::{ClientError, Result};
use crate::http::{build_url, HttpTransport, ReqwestTransport, RequestParts, Response};
use crate::retry::{RetryMap, RetryPolicy};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service endpoint, e.g. `http://search.example.com:8100`.
    pub endpoint: String,
    /// Api version prefixed to every path.
    pub api_version: String,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Whether a new query cancels the outstanding one.
    pub override_queries: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_version: "v1".to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
            override_queries: true,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for an endpoint.
    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the api version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Control overlapping-query cancellation.
    pub fn with_override_queries(mut self, override_queries: bool) -> Self {
        self.override_queries = override_queries;
        self
    }
}

/// The transport contract repositories consume: one `get` entry point for
/// every verb, plus explicit aborting of the in-flight request.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a request and resolve to its response.
    async fn get(
        &self,
        url: &str,
        method: &str,
        query: &[(String, String)],
        body: Value,
        headers: &[(String, String)],
    ) -> Result<Response>;

    /// Cancel the in-flight request, if any.
    fn abort(&self);
}

/// Transport client over a raw [`HttpTransport`].
///
/// Responsibilities, in request order:
///
/// 1. build the versioned url and query string;
/// 2. consult the response cache keyed by canonical request identity and
///    return hits verbatim, with no network call and no cache refresh;
/// 3. for GET requests with query override enabled, cancel the previously
///    outstanding request so exactly one logical current request exists
///    per client instance;
/// 4. dispatch, then store successful responses under the same identity.
///
/// Retry policies are resolved through [`SearchClient::retry_policy_for`];
/// executing a resolved policy is left to the caller.
pub struct SearchClient<T: HttpTransport> {
    transport: T,
    version: String,
    override_queries: bool,
    cache: Box<dyn ResponseCache>,
    retry_map: RetryMap,
    cancel: Mutex<watch::Sender<bool>>,
}

impl SearchClient<ReqwestTransport> {
    /// Create a production client from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(
            config.endpoint.clone(),
            Duration::from_millis(config.connect_timeout_ms),
            Duration::from_millis(config.request_timeout_ms),
        )?;

        Ok(Self::new(
            transport,
            &config.api_version,
            config.override_queries,
        ))
    }
}

impl<T: HttpTransport> SearchClient<T> {
    /// Create a client over a raw transport with no caching and no retry
    /// policies.
    pub fn new(transport: T, api_version: &str, override_queries: bool) -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            transport,
            version: api_version.trim_matches('/').to_string(),
            override_queries,
            cache: Box::new(NoCache),
            retry_map: RetryMap::new(),
            cancel: Mutex::new(sender),
        }
    }

    /// Attach a response cache.
    pub fn with_cache(mut self, cache: impl ResponseCache + 'static) -> Self {
        self.cache = Box::new(cache);
        self
    }

    /// Attach retry policies.
    pub fn with_retry_map(mut self, retry_map: RetryMap) -> Self {
        self.retry_map = retry_map;
        self
    }

    /// Resolve the retry policy that would apply to `(url, method)`.
    pub fn retry_policy_for(&self, url: &str, method: &str) -> Option<&RetryPolicy> {
        self.retry_map.lookup(url, method)
    }

    /// The canonical identity a request is cached under.
    fn request_identity(method: &str, url: &str, body: &Value) -> String {
        format!("{} {url} {body}", method.to_lowercase())
    }

    /// Cancel the outstanding request and regenerate the cancellation
    /// slot for the next one.
    fn cancel_outstanding(slot: &mut watch::Sender<bool>) {
        let previous = std::mem::replace(slot, watch::channel(false).0);
        // Late subscribers of the old slot still observe the flag.
        let _ = previous.send(true);
    }
}

#[async_trait]
impl<T: HttpTransport> HttpClient for SearchClient<T> {
    async fn get(
        &self,
        url: &str,
        method: &str,
        query: &[(String, String)],
        body: Value,
        headers: &[(String, String)],
    ) -> Result<Response> {
        let built_url = build_url(&self.version, url, query);
        let identity = Self::request_identity(method, &built_url, &body);

        if let Some(cached) = self.cache.get(&identity) {
            tracing::debug!(url = %built_url, "response cache hit");
            return Ok(cached);
        }

        let cancellation = {
            let mut slot = self
                .cancel
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if self.override_queries && method.eq_ignore_ascii_case("get") {
                tracing::debug!(url = %built_url, "overriding outstanding query");
                Self::cancel_outstanding(&mut slot);
            }
            slot.subscribe()
        };

        let parts = RequestParts::new(built_url, body, headers.to_vec());
        let response = tokio::select! {
            response = self.transport.send(method, &parts) => response?,
            _ = cancelled(cancellation) => return Err(ClientError::Cancelled),
        };

        self.cache.put(&identity, response.clone());

        Ok(response)
    }

    fn abort(&self) {
        let mut slot = self
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::cancel_outstanding(&mut slot);
    }
}

/// Resolve once the cancellation flag is raised; never resolve if the
/// slot was replaced without raising it.
async fn cancelled(mut receiver: watch::Receiver<bool>) {
    if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_identity_includes_method_url_and_body() {
        let body = serde_json::json!({"query": {"q": "shoes"}});
        let identity = SearchClient::<ReqwestTransport>::request_identity(
            "GET",
            "/v1?app_id=a",
            &body,
        );
        assert_eq!(identity, format!("get /v1?app_id=a {body}"));
    }

    #[test]
    fn test_retry_policy_resolution() {
        let mut retry_map = RetryMap::new();
        retry_map.insert(RetryPolicy::new("*", "get", 3, 1000));

        let client = SearchClient::from_config(&ClientConfig::endpoint("http://localhost:8100"))
            .unwrap()
            .with_retry_map(retry_map);

        assert_eq!(client.retry_policy_for("/items", "get").unwrap().retries(), 3);
        assert!(client.retry_policy_for("/items", "post").is_none());
    }
}
