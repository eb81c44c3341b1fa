//! Response caching.
//!
//! The dispatcher talks to its cache through [`ResponseCache`], so storage and
//! eviction stay the cache's business. [`QueryCache`] is the in-memory default:
//! unbounded, no TTL, entries live as long as the cache does.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::envelope::Envelope;
use crate::http::Method;

pub mod key;

pub use key::CacheKey;

/// Key-value store the dispatcher consults before and after each call.
pub trait ResponseCache: Send + Sync {
    /// Derives the key for a request. Must be pure and deterministic.
    fn key(&self, method: &Method, url: &str, params: &Value) -> CacheKey {
        CacheKey::new(method, url, params)
    }

    /// Returns a previously stored envelope, if any.
    fn retrieve(&self, key: &CacheKey) -> Option<Envelope>;

    /// Stores `entry` under `key`, replacing any previous entry.
    fn store(&self, key: CacheKey, entry: Envelope);
}

/// Unbounded in-memory [`ResponseCache`].
///
/// # Examples
///
/// ```
/// use searchreq::cache::{QueryCache, ResponseCache};
/// use searchreq::envelope::Envelope;
/// use searchreq::http::{Method, Response};
/// use serde_json::json;
///
/// let cache = QueryCache::new();
/// let key = cache.key(&Method::Post, "https://api.x/search", &json!({"q": "a"}));
/// assert!(cache.retrieve(&key).is_none());
///
/// cache.store(key.clone(), Envelope::received(Response::new(200), json!({"results": []})));
/// assert_eq!(cache.retrieve(&key).unwrap().json, Some(json!({"results": []})));
/// ```
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<CacheKey, Envelope>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries().clear();
    }

    // A panic while holding the lock cannot leave the map half-written, so a
    // poisoned lock is still safe to use.
    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Envelope>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResponseCache for QueryCache {
    fn retrieve(&self, key: &CacheKey) -> Option<Envelope> {
        self.entries().get(key).cloned()
    }

    fn store(&self, key: CacheKey, entry: Envelope) {
        self.entries().insert(key, entry);
    }
}
