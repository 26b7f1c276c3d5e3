//! Behavioral tests of the transport client: response caching and
//! overlapping-query cancellation over a mock raw transport.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use strata_search_client::{
    ClientError, HttpClient, HttpTransport, InMemoryCache, RequestParts, Response, Result,
    SearchClient,
};

/// Transport that answers every request with its call number.
struct CountingTransport {
    calls: AtomicUsize,
}

impl CountingTransport {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for CountingTransport {
    async fn send(&self, _method: &str, _parts: &RequestParts) -> Result<Response> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Response::new(200, serde_json::json!({"call": call})))
    }
}

/// Transport whose first request never completes; later ones answer.
struct BlockingFirstTransport {
    calls: AtomicUsize,
}

impl BlockingFirstTransport {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl HttpTransport for BlockingFirstTransport {
    async fn send(&self, _method: &str, _parts: &RequestParts) -> Result<Response> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            std::future::pending::<()>().await;
        }

        Ok(Response::new(200, serde_json::json!({"call": call})))
    }
}

fn no_params() -> Vec<(String, String)> {
    Vec::new()
}

#[tokio::test]
async fn cache_hit_skips_the_network_and_returns_verbatim() {
    let client = SearchClient::new(CountingTransport::new(), "v1", true)
        .with_cache(InMemoryCache::new(16));

    let body = serde_json::json!({"query": {"q": "shoes"}});
    let first = client
        .get("/", "get", &no_params(), body.clone(), &[])
        .await
        .unwrap();
    let second = client
        .get("/", "get", &no_params(), body.clone(), &[])
        .await
        .unwrap();

    // One network call; the cached response comes back unchanged.
    assert_eq!(first, second);

    // A different body is a different request identity.
    client
        .get("/", "get", &no_params(), serde_json::json!({"query": {"q": "boots"}}), &[])
        .await
        .unwrap();
    assert_eq!(second.body()["call"], serde_json::json!(0));
}

#[tokio::test]
async fn overlapping_get_cancels_the_outstanding_one() {
    let client = Arc::new(SearchClient::new(BlockingFirstTransport::new(), "v1", true));

    let first = {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            client
                .get("/", "get", &no_params(), serde_json::json!({"q": "a"}), &[])
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = client
        .get("/", "get", &no_params(), serde_json::json!({"q": "b"}), &[])
        .await
        .unwrap();
    assert_eq!(second.code(), 200);

    // The first request resolves as cancelled, never as a response.
    let outcome = first.await.unwrap();
    assert_eq!(outcome.unwrap_err(), ClientError::Cancelled);
}

#[tokio::test]
async fn non_get_requests_do_not_cancel_each_other() {
    let client = Arc::new(SearchClient::new(BlockingFirstTransport::new(), "v1", true));

    let first = {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            client
                .get("/items", "post", &no_params(), serde_json::json!({"n": 1}), &[])
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    client
        .get("/items", "post", &no_params(), serde_json::json!({"n": 2}), &[])
        .await
        .unwrap();

    // The first POST is still in flight, not cancelled.
    let still_pending = tokio::time::timeout(Duration::from_millis(100), first).await;
    assert!(still_pending.is_err());
}

#[tokio::test]
async fn disabled_override_leaves_outstanding_gets_alone() {
    let client = Arc::new(SearchClient::new(BlockingFirstTransport::new(), "v1", false));

    let first = {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            client
                .get("/", "get", &no_params(), serde_json::json!({"q": "a"}), &[])
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    client
        .get("/", "get", &no_params(), serde_json::json!({"q": "b"}), &[])
        .await
        .unwrap();

    let still_pending = tokio::time::timeout(Duration::from_millis(100), first).await;
    assert!(still_pending.is_err());
}

#[tokio::test]
async fn abort_cancels_the_in_flight_request() {
    let client = Arc::new(SearchClient::new(BlockingFirstTransport::new(), "v1", true));

    let first = {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            client
                .get("/", "get", &no_params(), serde_json::json!({"q": "a"}), &[])
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    client.abort();

    let outcome = first.await.unwrap();
    assert_eq!(outcome.unwrap_err(), ClientError::Cancelled);
}
