//! Bounded TTL cache from canonical query keys to result pages.
//!
//! Entries live for a fixed TTL and the map holds a fixed number of entries;
//! when full, the oldest-inserted entry is evicted. Eviction is deliberately
//! insertion-order based rather than true LRU — a read does not refresh an
//! entry's position. Expired entries are removed on read for memory hygiene.
//!
//! The cache is owned by one search session and accessed from one place at a
//! time, so the API is plain `&mut self` with no interior locking.

use crate::model::ResultPage;
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Tuning knobs for [`ResultCache`]. Defaults match the observed behavior of
/// the search pages: 60 second TTL, 10 entries.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            capacity: 10,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    page: Arc<ResultPage>,
    cached_at: Instant,
}

/// Insertion-ordered result cache. Construct one per session; there is no
/// global shared instance.
#[derive(Debug)]
pub struct ResultCache {
    entries: IndexMap<String, CacheEntry>,
    config: CacheConfig,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ResultCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: IndexMap::with_capacity(config.capacity),
            config,
        }
    }

    /// Look up a fresh entry. Entries older than the TTL are misses and are
    /// dropped on the spot.
    pub fn get(&mut self, key: &str) -> Option<Arc<ResultPage>> {
        let entry = self.entries.get(key)?;
        if entry.cached_at.elapsed() < self.config.ttl {
            return Some(entry.page.clone());
        }
        // `shift_remove` keeps the remaining insertion order intact.
        self.entries.shift_remove(key);
        debug!(key, "expired cache entry dropped");
        None
    }

    /// Insert or overwrite an entry, evicting the oldest-inserted entry first
    /// when at capacity. Overwrites count as fresh insertions.
    pub fn put(&mut self, key: String, page: Arc<ResultPage>) {
        self.entries.shift_remove(&key);
        if self.entries.len() >= self.config.capacity
            && let Some((evicted, _)) = self.entries.shift_remove_index(0)
        {
            debug!(key = evicted, "cache at capacity, oldest entry evicted");
        }
        self.entries.insert(
            key,
            CacheEntry {
                page,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a key is present, regardless of freshness. Useful for
    /// diagnostics; `get` is the authority on hits.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every expired entry. `get` already prunes what it touches; this
    /// sweeps the rest.
    pub fn purge_expired(&mut self) {
        let ttl = self.config.ttl;
        self.entries.retain(|_, entry| entry.cached_at.elapsed() < ttl);
    }
}
