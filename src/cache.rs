//! Bounded least-recently-used cache for remote call results.
//!
//! Inference and translation calls are expensive and deterministic enough to
//! reuse within a session, but unbounded memoization leaks memory and never
//! invalidates. This cache has a fixed capacity, evicts the least recently
//! used entry on overflow, and callers can bypass it per request.
//!
//! Keys are SHA-256 digests of `(namespace, scope, text)` so that raw
//! document text is never held as a map key.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;

/// Fixed-capacity LRU cache keyed by hashed request identity.
pub struct ResultCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

struct CacheInner {
    entries: HashMap<String, Entry>,
    clock: u64,
}

struct Entry {
    value: String,
    last_used: u64,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                clock: 0,
            }),
            capacity,
        }
    }

    /// Look up a cached value, refreshing its recency on a hit.
    pub fn get(&self, namespace: &str, scope: &str, text: &str) -> Option<String> {
        let key = cache_key(namespace, scope, text);
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.clock += 1;
        let tick = inner.clock;
        let entry = inner.entries.get_mut(&key)?;
        entry.last_used = tick;
        Some(entry.value.clone())
    }

    /// Insert a value, evicting the least recently used entry when full.
    pub fn insert(&self, namespace: &str, scope: &str, text: &str, value: String) {
        if self.capacity == 0 {
            return;
        }
        let key = cache_key(namespace, scope, text);
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.clock += 1;
        let tick = inner.clock;

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            if let Some(stale) = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
            {
                inner.entries.remove(&stale);
            }
        }

        inner.entries.insert(
            key,
            Entry {
                value,
                last_used: tick,
            },
        );
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").entries.len()
    }

    /// Whether the cache currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(namespace: &str, scope: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update([0]);
    hasher.update(scope.as_bytes());
    hasher.update([0]);
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
