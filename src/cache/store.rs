//! In-process cache tier with insertion-order eviction and per-entry TTL

use crate::cache::{
    config::LocalCacheConfig,
    entry::CacheEntry,
    types::{CacheKey, CachePayload, CacheStats},
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info};

/// Bounded in-process cache
///
/// This implementation provides:
/// - Synchronous, non-suspending access behind a single mutex
/// - Lazy TTL expiry checked on read
/// - Eviction of the oldest-inserted entry when full
///
/// Eviction is FIFO by insertion time, not LRU: reads never refresh an
/// entry's position. Callers that think of this tier as "the LRU cache"
/// get FIFO-with-TTL on purpose; do not switch it to access order.
pub struct LocalCache {
    /// Cache configuration
    config: LocalCacheConfig,

    /// Internal storage, map + order index + stats under one lock
    store: Mutex<CacheStore>,
}

/// Internal cache storage
struct CacheStore {
    /// Main storage: key -> slot
    entries: HashMap<CacheKey, Slot>,

    /// Insertion order: sequence -> key, oldest first
    insertion_order: BTreeMap<u64, CacheKey>,

    /// Next insertion sequence number
    next_sequence: u64,

    stats: CacheStats,
}

struct Slot {
    entry: CacheEntry,
    sequence: u64,
}

impl CacheStore {
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let slot = self.entries.remove(key)?;
        self.insertion_order.remove(&slot.sequence);
        Some(slot.entry)
    }

    fn evict_oldest(&mut self) -> Option<CacheKey> {
        let (_, key) = self.insertion_order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

impl LocalCache {
    /// Create a new cache with the given configuration
    pub fn new(config: LocalCacheConfig) -> Self {
        info!(
            "Initializing local cache (max_entries: {}, default_ttl: {:?})",
            config.max_entries, config.default_ttl
        );

        let store = CacheStore {
            entries: HashMap::new(),
            insertion_order: BTreeMap::new(),
            next_sequence: 0,
            stats: CacheStats::default(),
        };

        Self {
            config,
            store: Mutex::new(store),
        }
    }

    /// The configuration this cache was built with
    pub fn config(&self) -> &LocalCacheConfig {
        &self.config
    }

    /// Get a payload from the cache
    ///
    /// Absent and expired keys count as misses; an expired entry is removed
    /// under the same lock that observed it.
    pub fn get(&self, key: &str) -> Option<CachePayload> {
        let mut guard = self.store.lock();
        let store = &mut *guard;

        let expired = match store.entries.get(key) {
            Some(slot) if !slot.entry.is_expired() => {
                let payload = slot.entry.payload.clone();
                store.stats.hits += 1;
                debug!("Cache hit: {}", key);
                return Some(payload);
            }
            Some(_) => true,
            None => false,
        };

        store.stats.misses += 1;
        if expired {
            debug!("Cache entry expired: {}", key);
            store.remove_entry(key);
            store.stats.evictions_ttl += 1;
        } else {
            debug!("Cache miss: {}", key);
        }
        None
    }

    /// Insert a payload with the configured default TTL
    pub fn set(&self, key: CacheKey, payload: CachePayload) {
        self.set_with_ttl(key, payload, self.config.default_ttl);
    }

    /// Insert a payload with an explicit TTL
    ///
    /// A new key arriving at capacity evicts the entry with the oldest
    /// insertion time. Overwriting a key gives it a fresh insertion time.
    pub fn set_with_ttl(&self, key: CacheKey, payload: CachePayload, ttl: Duration) {
        let entry = CacheEntry::new(key.clone(), payload, ttl);

        let mut store = self.store.lock();

        if let Some(previous) = store.entries.get(&key).map(|slot| slot.sequence) {
            debug!("Updating existing cache entry: {}", key);
            store.insertion_order.remove(&previous);
        } else {
            while store.entries.len() >= self.config.max_entries {
                match store.evict_oldest() {
                    Some(evicted) => {
                        debug!("Evicting entry due to max_entries limit: {}", evicted);
                        store.stats.evictions_capacity += 1;
                    }
                    None => break,
                }
            }
            debug!("Inserting new cache entry: {}", key);
        }

        let sequence = store.next_sequence;
        store.next_sequence += 1;
        store.insertion_order.insert(sequence, key.clone());
        store.entries.insert(key, Slot { entry, sequence });
    }

    /// Check if a live entry exists (does not touch statistics)
    pub fn contains_key(&self, key: &str) -> bool {
        let store = self.store.lock();
        store
            .entries
            .get(key)
            .is_some_and(|slot| !slot.entry.is_expired())
    }

    /// Remove a specific entry from the cache
    pub fn remove(&self, key: &str) -> Option<CachePayload> {
        let mut store = self.store.lock();

        let entry = store.remove_entry(key)?;
        store.stats.invalidations += 1;
        debug!("Removed cache entry: {}", key);
        Some(entry.payload)
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        let mut store = self.store.lock();

        let count = store.entries.len();
        store.entries.clear();
        store.insertion_order.clear();
        store.stats.invalidations += count as u64;

        info!("Cleared {} entries from local cache", count);
    }

    /// Remove all expired entries, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let mut store = self.store.lock();

        let expired_keys: Vec<CacheKey> = store
            .entries
            .iter()
            .filter(|(_, slot)| slot.entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            store.remove_entry(key);
        }
        store.stats.evictions_ttl += expired_keys.len() as u64;

        if !expired_keys.is_empty() {
            debug!("Purged {} expired entries", expired_keys.len());
        }
        expired_keys.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let store = self.store.lock();
        CacheStats {
            entries: store.entries.len(),
            ..store.stats.clone()
        }
    }

    /// Number of physically stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.store.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().entries.is_empty()
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new(LocalCacheConfig::default())
    }
}
