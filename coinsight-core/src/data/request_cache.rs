//! In-memory response cache keyed by endpoint and parameter map.
//!
//! Keys compare and hash structurally: two requests with the same endpoint
//! and the same parameters hit the same entry regardless of the order the
//! parameters were added in.

use lru::LruCache;
use serde_json::Value;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const DEFAULT_CACHE_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey {
    endpoint: String,
    params: BTreeMap<String, String>,
}

impl RequestKey {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Parameters as query pairs, sorted by name.
    pub fn query(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Bounded LRU of parsed JSON responses. Capacity 0 disables caching.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Option<Mutex<LruCache<RequestKey, Value>>>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, LruCache<RequestKey, Value>>> {
        self.entries
            .as_ref()
            .map(|m| m.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn get(&self, key: &RequestKey) -> Option<Value> {
        self.lock()?.get(key).cloned()
    }

    pub fn insert(&self, key: RequestKey, value: Value) {
        if let Some(mut cache) = self.lock() {
            cache.put(key, value);
        }
    }

    pub fn contains(&self, key: &RequestKey) -> bool {
        self.lock().is_some_and(|cache| cache.contains(key))
    }

    pub fn len(&self) -> usize {
        self.lock().map_or(0, |cache| cache.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Some(mut cache) = self.lock() {
            cache.clear();
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
