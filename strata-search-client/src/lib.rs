//! HTTP client for the Strata search service.
//!
//! This crate carries the cross-cutting transport concerns the wire model
//! depends on:
//!
//! - [`SearchClient`]: versioned paths, query-string construction,
//!   response caching by request identity, retry-policy lookup and
//!   single-flight cancellation of overlapping GET queries
//! - [`HttpRepository`]: the repository façade scoping calls to one
//!   `(app, index, token)` triple, with index administration and buffered
//!   bulk item writes
//! - [`ReqwestTransport`]: the raw HTTP implementation behind the
//!   [`HttpTransport`] contract
//!
//! # Example
//!
//! ```ignore
//! use strata_search_client::{ClientConfig, RepositoryConfig, Strata};
//! use strata_search_protocol::Query;
//!
//! let mut strata = Strata::create();
//! let repository = strata.create_repository(
//!     "products",
//!     RepositoryConfig::new("app-1", "main", "token")
//!         .with_client(ClientConfig::endpoint("http://search.example.com:8100")),
//! )?;
//!
//! let result = repository.query(&Query::create("shoes", 1, 20)).await?;
//! ```

mod cache;
mod client;
mod error;
mod http;
mod repository;
mod retry;

pub use cache::{InMemoryCache, NoCache, ResponseCache};
pub use client::{ClientConfig, HttpClient, SearchClient};
pub use error::{ClientError, Result};
pub use http::{build_url, HttpTransport, ReqwestTransport, RequestParts, Response};
pub use repository::{HttpRepository, Repository, DEFAULT_BULK_NUMBER};
pub use retry::{
    RetryMap, RetryPolicy, DEFAULT_MICROSECONDS_BETWEEN_RETRIES, RETRY_WILDCARD,
};

use std::collections::HashMap;
use std::sync::Arc;

/// Configuration of one named repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Application identifier.
    pub app_id: String,
    /// Index identifier.
    pub index_id: String,
    /// Access token.
    pub token: String,
    /// Transport client configuration.
    pub client: ClientConfig,
    /// Cached responses kept per repository; zero disables caching.
    pub cache_entries: usize,
}

impl RepositoryConfig {
    /// Create a repository configuration.
    pub fn new(
        app_id: impl Into<String>,
        index_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            index_id: index_id.into(),
            token: token.into(),
            client: ClientConfig::default(),
            cache_entries: 0,
        }
    }

    /// Set the transport client configuration.
    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Enable response caching with the given capacity.
    pub fn with_cache_entries(mut self, cache_entries: usize) -> Self {
        self.cache_entries = cache_entries;
        self
    }
}

/// Production repository type built by [`Strata`].
pub type StrataRepository = HttpRepository<SearchClient<ReqwestTransport>>;

/// Entry point holding named repositories.
#[derive(Default)]
pub struct Strata {
    repositories: HashMap<String, Arc<StrataRepository>>,
}

impl Strata {
    /// Create an empty instance.
    pub fn create() -> Self {
        Self::default()
    }

    /// Build, register and return a repository under `name`.
    pub fn create_repository(
        &mut self,
        name: impl Into<String>,
        config: RepositoryConfig,
    ) -> Result<Arc<StrataRepository>> {
        let mut client = SearchClient::from_config(&config.client)?;
        if config.cache_entries > 0 {
            client = client.with_cache(InMemoryCache::new(config.cache_entries));
        }

        let repository = Arc::new(HttpRepository::new(
            client,
            config.app_id,
            config.index_id,
            config.token,
        ));
        self.repositories
            .insert(name.into(), Arc::clone(&repository));

        Ok(repository)
    }

    /// A registered repository by name.
    pub fn repository(&self, name: &str) -> Option<Arc<StrataRepository>> {
        self.repositories.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_look_up_repository() {
        let mut strata = Strata::create();
        let config = RepositoryConfig::new("app", "main", "token")
            .with_client(ClientConfig::endpoint("http://localhost:8100"))
            .with_cache_entries(64);

        strata.create_repository("products", config).unwrap();

        assert!(strata.repository("products").is_some());
        assert!(strata.repository("missing").is_none());
    }
}
