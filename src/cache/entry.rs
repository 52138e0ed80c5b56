//! Cache entry with TTL support

use crate::cache::types::{CacheKey, CachePayload};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// A cached payload with its insertion time and lifetime
///
/// Entries are never mutated in place; a re-write replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cache key
    pub key: CacheKey,

    /// The cached payload
    pub payload: CachePayload,

    /// Wall-clock insertion time
    pub created_at: DateTime<Utc>,

    /// Entry lifetime
    pub ttl: Duration,

    // Monotonic insertion time; expiry is measured against this so wall-clock
    // adjustments cannot resurrect or expire entries early.
    inserted: Instant,
}

impl CacheEntry {
    /// Create a new cache entry stamped with the current time
    pub fn new(key: CacheKey, payload: CachePayload, ttl: Duration) -> Self {
        Self {
            key,
            payload,
            created_at: Utc::now(),
            ttl,
            inserted: Instant::now(),
        }
    }

    /// Check if the entry has expired
    ///
    /// An entry is visible while `now < created_at + ttl`.
    pub fn is_expired(&self) -> bool {
        self.inserted.elapsed() >= self.ttl
    }

    /// Get time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        self.ttl
            .checked_sub(self.inserted.elapsed())
            .filter(|remaining| !remaining.is_zero())
    }

    /// Get the age of the entry
    pub fn age(&self) -> Duration {
        self.inserted.elapsed()
    }

    /// Wall-clock expiry time
    pub fn expires_at(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
