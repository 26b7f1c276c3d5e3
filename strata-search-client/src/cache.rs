//! Response caching.
//!
//! Responses are cached by canonical request identity. The cache is a
//! synchronously-accessed key/value store; all access happens on the
//! single control-flow path driving a client instance, and bookkeeping
//! never raises.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::http::Response;

/// Key/value response store consulted before any network call.
pub trait ResponseCache: Send + Sync {
    /// Look up a cached response.
    fn get(&self, key: &str) -> Option<Response>;

    /// Store a response.
    fn put(&self, key: &str, response: Response);

    /// Drop one entry.
    fn invalidate(&self, key: &str);

    /// Drop every entry.
    fn clear(&self);
}

/// Bounded in-memory cache with least-recently-used eviction.
pub struct InMemoryCache {
    inner: Mutex<LruCache<String, Response>>,
}

impl InMemoryCache {
    /// Create a cache holding up to `max_entries` responses.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries.max(1)).expect("capacity is at least one");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl ResponseCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<Response> {
        let mut cache = self.inner.lock().ok()?;
        cache.get(key).cloned()
    }

    fn put(&self, key: &str, response: Response) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.put(key.to_string(), response);
        }
    }

    fn invalidate(&self, key: &str) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.pop(key);
        }
    }

    fn clear(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.clear();
        }
    }
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.inner.lock().map(|c| c.len()).unwrap_or(0);
        f.debug_struct("InMemoryCache").field("len", &len).finish()
    }
}

/// Cache that stores nothing; every request hits the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl ResponseCache for NoCache {
    fn get(&self, _key: &str) -> Option<Response> {
        None
    }

    fn put(&self, _key: &str, _response: Response) {}

    fn invalidate(&self, _key: &str) {}

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(code: u16) -> Response {
        Response::new(code, serde_json::json!({}))
    }

    #[test]
    fn test_cache_basic_operations() {
        let cache = InMemoryCache::new(10);

        assert!(cache.get("a").is_none());

        cache.put("a", response(200));
        assert_eq!(cache.get("a").unwrap().code(), 200);

        cache.invalidate("a");
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_cache_lru_eviction() {
        let cache = InMemoryCache::new(2);

        cache.put("a", response(200));
        cache.put("b", response(200));

        // Touch "a" so "b" is the eviction candidate.
        cache.get("a");
        cache.put("c", response(200));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_cache_clear() {
        let cache = InMemoryCache::new(10);
        cache.put("a", response(200));
        cache.put("b", response(201));

        cache.clear();

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_no_cache_stores_nothing() {
        let cache = NoCache;
        cache.put("a", response(200));
        assert!(cache.get("a").is_none());
    }
}
