//! Retry-policy configuration and lookup.
//!
//! A [`RetryMap`] answers "which retry policy applies to this request"
//! with wildcard fallbacks. Resolution is configuration only: executing
//! the resolved policy is an extension point for the caller, not
//! something the transport client does on its own.

use serde::{Deserialize, Serialize};

/// Wildcard matching any url or any method.
pub const RETRY_WILDCARD: &str = "*";

/// Default pause between retries, in microseconds.
pub const DEFAULT_MICROSECONDS_BETWEEN_RETRIES: u64 = 1000;

fn default_pattern() -> String {
    RETRY_WILDCARD.to_string()
}

fn default_pause() -> u64 {
    DEFAULT_MICROSECONDS_BETWEEN_RETRIES
}

/// One retry policy, scoped to a url/method pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_pattern")]
    url: String,
    #[serde(default = "default_pattern")]
    method: String,
    #[serde(default)]
    retries: u32,
    #[serde(default = "default_pause")]
    microseconds_between_retries: u64,
}

impl RetryPolicy {
    /// Create a policy for a url/method pattern; either side may be the
    /// [`RETRY_WILDCARD`].
    pub fn new(
        url: impl Into<String>,
        method: impl Into<String>,
        retries: u32,
        microseconds_between_retries: u64,
    ) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            retries,
            microseconds_between_retries,
        }
    }

    /// The url pattern.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The method pattern.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// How many attempts the policy allows.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// The pause between attempts, in microseconds.
    pub fn microseconds_between_retries(&self) -> u64 {
        self.microseconds_between_retries
    }
}

/// Retry policies keyed by url/method pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryMap {
    policies: std::collections::BTreeMap<(String, String), RetryPolicy>,
}

impl RetryMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy under its url/method pattern.
    pub fn insert(&mut self, policy: RetryPolicy) {
        self.policies
            .insert((policy.url.clone(), policy.method.clone()), policy);
    }

    /// Build a map from a list of policies.
    pub fn from_policies(policies: Vec<RetryPolicy>) -> Self {
        let mut map = Self::new();
        for policy in policies {
            map.insert(policy);
        }

        map
    }

    /// Resolve the policy applying to `(url, method)`.
    ///
    /// Priority order: exact match, then method with any url, then url
    /// with any method, then the full wildcard.
    pub fn lookup(&self, url: &str, method: &str) -> Option<&RetryPolicy> {
        let candidates = [
            (url, method),
            (RETRY_WILDCARD, method),
            (url, RETRY_WILDCARD),
            (RETRY_WILDCARD, RETRY_WILDCARD),
        ];

        candidates
            .iter()
            .find_map(|(u, m)| self.policies.get(&(u.to_string(), m.to_string())))
    }
}
