//! Core type definitions for the cache system

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache key type - a namespaced fingerprint (see [`crate::cache::key`])
pub type CacheKey = String;

/// Cached response payload, opaque to the cache layer
pub type CachePayload = serde_json::Value;

/// Statistics for the local tier
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CacheStats {
    /// Total number of cache hits
    pub hits: u64,

    /// Total number of cache misses (absent or expired)
    pub misses: u64,

    /// Number of entries currently stored
    pub entries: usize,

    /// Entries evicted because the cache was at capacity
    pub evictions_capacity: u64,

    /// Entries dropped because their TTL elapsed
    pub evictions_ttl: u64,

    /// Entries removed explicitly (remove/clear)
    pub invalidations: u64,
}

impl CacheStats {
    /// Fraction of reads that hit, 0.0 when there were no reads
    pub fn hit_rate(&self) -> f64 {
        hit_rate(self.hits, self.misses)
    }

    /// Calculate total evictions
    pub fn total_evictions(&self) -> u64 {
        self.evictions_capacity + self.evictions_ttl
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}, entries: {}, evictions: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.entries,
            self.total_evictions()
        )
    }
}

/// Statistics for the networked tier
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NetworkedCacheStats {
    pub hits: u64,
    pub misses: u64,

    /// Keys currently stored under this cache's namespace
    pub remote_entry_count: usize,

    /// Whether the most recent administrative call to the backend succeeded
    pub backend_reachable: bool,
}

impl NetworkedCacheStats {
    pub fn hit_rate(&self) -> f64 {
        hit_rate(self.hits, self.misses)
    }
}

impl fmt::Display for NetworkedCacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NetworkedCacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}, remote_entries: {}, reachable: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.remote_entry_count,
            self.backend_reachable
        )
    }
}

/// Lock-free hit/miss counters shared by the sync and async surfaces
#[derive(Debug, Default)]
pub(crate) struct HitCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HitCounters {
    pub(crate) fn record(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
