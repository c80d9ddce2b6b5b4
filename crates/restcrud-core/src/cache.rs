// ── Ephemeral TTL cache ──
//
// String-keyed memoization with a per-entry time-to-live. Expired entries
// are evicted lazily by the read that discovers them; nothing sweeps in the
// background. Last write wins per key.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::trace;

/// TTL applied by [`EphemeralCache::set`] unless the cache was built with
/// another default.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    /// `None` when `now + ttl` does not fit in an `Instant`: never expires.
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }
}

/// Concurrent TTL cache backed by `DashMap`.
#[derive(Debug)]
pub struct EphemeralCache<V: Clone> {
    entries: DashMap<String, Entry<V>>,
    default_ttl: Duration,
}

impl<V: Clone> Default for EphemeralCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> EphemeralCache<V> {
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Store `value` under `key` with the default TTL, replacing any entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries.insert(key.into(), Entry { value, expires_at });
    }

    /// Fresh value for `key`, or `None`.
    ///
    /// An expired entry is removed as a side effect of this call.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let fresh = match self.entries.get(key) {
            None => {
                trace!(key, "cache miss");
                return None;
            }
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => None,
        };

        if fresh.is_some() {
            trace!(key, "cache hit");
        } else {
            // Re-check under the shard lock: a concurrent `set` may have
            // refreshed the entry since the read above.
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
            trace!(key, "cache entry expired");
        }
        fresh
    }

    /// Evict `key`. Returns `true` if an entry (fresh or stale) was held.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries held, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
