//! Process-wide TTL cache for API response payloads.
//!
//! Keys are request fingerprints (path + canonicalized query), values are
//! the JSON payloads the handlers would otherwise recompute. Entries live
//! until their TTL elapses or the process restarts; there is no eviction
//! policy beyond read-time expiry. Concurrent writes to the same key are
//! last-write-wins.
//!
//! Constructed once at startup and shared via `Arc` — never accessed as
//! ambient global state, so tests can inject their own instance.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// In-memory TTL cache. Pure memory, no I/O — operations never fail.
#[derive(Default)]
pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value if present and fresh. An expired entry is
    /// removed on the way out; a plain miss has no side effect.
    pub fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                Some(entry) if Instant::now() < entry.expires_at => {
                    return Some(entry.value.clone());
                }
                Some(_) => {} // expired — fall through to evict
                None => return None,
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // Re-check under the write lock: a concurrent set may have
        // refreshed the entry between the two lock acquisitions.
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite unconditionally. The value is stored as-is.
    pub fn set(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), entry);
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Fingerprinting
// ---------------------------------------------------------------------------

/// Derive a cache key from a request's routable identity.
///
/// Query pairs are sorted by key (then value) so logically identical
/// requests converge on the same entry regardless of parameter order or
/// which code path issued them.
pub fn fingerprint(path: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let mut pairs: Vec<&(String, String)> = params.iter().collect();
    pairs.sort();

    let query: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{path}?{}", query.join("&"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
