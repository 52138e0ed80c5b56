//! Networked cache tier with server-side TTL and soft failure semantics
//!
//! Every backend error, timeout or malformed record degrades to a miss (for
//! reads) or `false` (for writes and administrative calls). Failures are
//! visible only in logs and in [`NetworkedCacheStats::backend_reachable`].
//!
//! The synchronous methods call the backend on the caller's thread. The
//! `*_async` methods run the same internal operations on tokio's blocking
//! pool under a deadline; both surfaces share configuration and counters.

use crate::cache::{
    backend::{KvBackend, RedisBackend},
    config::NetworkedCacheConfig,
    health::HealthCheckResult,
    types::{CacheKey, CachePayload, HitCounters, NetworkedCacheStats},
};
use crate::error::{CacheError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Keys deleted per DEL round trip when clearing the namespace
const DELETE_BATCH: usize = 500;

/// Record stored in the backend: the payload plus write-time metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    /// The cached payload
    pub response: CachePayload,

    /// When the record was written
    pub cached_at: DateTime<Utc>,

    /// Original query text, if known
    pub query: Option<String>,

    /// Model that produced the response, if known
    pub model: Option<String>,

    /// Lifetime requested at write time, in whole seconds
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl StoredRecord {
    /// Lifetime left at `now`, zero once expired
    ///
    /// `None` when the record carries no TTL or its expiry is not representable.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Option<Duration> {
        let ttl = chrono::Duration::from_std(Duration::from_secs(self.ttl_secs?)).ok()?;
        let expires_at = self.cached_at.checked_add_signed(ttl)?;
        Some((expires_at - now).to_std().unwrap_or(Duration::ZERO))
    }
}

/// Write-time metadata attached to a stored record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteMetadata {
    pub query: Option<String>,
    pub model: Option<String>,
}

impl WriteMetadata {
    pub fn new(query: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            model: Some(model.into()),
        }
    }

    /// Pick up `query` and `model` string fields from an object payload
    pub fn from_payload(payload: &CachePayload) -> Self {
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(|value| value.as_str())
                .map(str::to_string)
        };
        Self {
            query: field("query"),
            model: field("model"),
        }
    }
}

/// Shared, network-addressed cache tier
///
/// Cloning is cheap and clones share the same client and statistics.
#[derive(Clone)]
pub struct NetworkedCache {
    inner: Arc<NetworkedInner>,
}

struct NetworkedInner {
    backend: Arc<dyn KvBackend>,
    config: NetworkedCacheConfig,
    counters: HitCounters,
    reachable: AtomicBool,
}

impl NetworkedInner {
    /// Run one backend operation, logging any failure.
    ///
    /// Every backend call goes through here; callers collapse the error to a
    /// miss or `false`.
    fn attempt<T>(
        &self,
        operation: &str,
        target: &str,
        f: impl FnOnce(&dyn KvBackend) -> Result<T>,
    ) -> Result<T> {
        f(self.backend.as_ref()).map_err(|e| {
            warn!("Networked cache {} failed for {}: {}", operation, target, e);
            e
        })
    }

    /// Payload and remaining lifetime of a live record
    fn fetch(&self, key: &str) -> Option<(CachePayload, Option<Duration>)> {
        let raw = self.attempt("GET", key, |backend| backend.get(key)).ok()??;

        match serde_json::from_str::<StoredRecord>(&raw) {
            Ok(record) => {
                let remaining = record.remaining_ttl(Utc::now());
                Some((record.response, remaining))
            }
            Err(e) => {
                warn!("Discarding malformed cache record for {}: {}", key, e);
                None
            }
        }
    }

    fn store(
        &self,
        key: &str,
        payload: CachePayload,
        ttl: Option<Duration>,
        metadata: WriteMetadata,
    ) -> bool {
        let ttl_secs = ttl_seconds(ttl.unwrap_or(self.config.default_ttl));
        let record = StoredRecord {
            response: payload,
            cached_at: Utc::now(),
            query: metadata.query,
            model: metadata.model,
            ttl_secs: Some(ttl_secs),
        };

        let body = match serde_json::to_string(&record) {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to serialize cache record for {}: {}", key, e);
                return false;
            }
        };

        let stored = self
            .attempt("SET", key, |backend| backend.set_ex(key, &body, ttl_secs))
            .is_ok();
        if stored {
            debug!("Stored networked cache entry: {} (ttl {}s)", key, ttl_secs);
        }
        stored
    }

    fn clear_namespace(&self) -> bool {
        let prefix = self.config.key_prefix.as_str();
        let deleted = self.attempt("CLEAR", prefix, |backend| {
            let keys = backend.keys_with_prefix(prefix)?;
            let mut deleted = 0;
            for batch in keys.chunks(DELETE_BATCH) {
                deleted += backend.delete(batch)?;
            }
            Ok(deleted)
        });
        self.reachable.store(deleted.is_ok(), Ordering::Relaxed);

        match deleted {
            Ok(count) => {
                info!("Cleared {} entries from networked cache namespace {}", count, prefix);
                true
            }
            Err(_) => false,
        }
    }

    fn remote_entry_count(&self) -> Option<usize> {
        let prefix = self.config.key_prefix.as_str();
        let count = self
            .attempt("SCAN", prefix, |backend| {
                backend.keys_with_prefix(prefix).map(|keys| keys.len())
            })
            .ok();
        self.reachable.store(count.is_some(), Ordering::Relaxed);
        count
    }

    fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let outcome = self.attempt("PING", &self.config.key_prefix, |backend| backend.ping());
        let elapsed = start.elapsed();

        let result = match outcome {
            Ok(()) => HealthCheckResult::healthy(elapsed, self.config.degraded_threshold),
            Err(e) => HealthCheckResult::unhealthy(elapsed, &e.to_string()),
        };
        self.reachable
            .store(result.status.is_operational(), Ordering::Relaxed);
        result
    }

    fn stats(&self, remote_entry_count: Option<usize>) -> NetworkedCacheStats {
        let (hits, misses) = self.counters.snapshot();
        NetworkedCacheStats {
            hits,
            misses,
            remote_entry_count: remote_entry_count.unwrap_or(0),
            backend_reachable: self.reachable.load(Ordering::Relaxed),
        }
    }
}

/// Whole seconds for the backend, rounded up and at least one
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

impl NetworkedCache {
    /// Create a networked cache over any backend
    pub fn new(backend: Arc<dyn KvBackend>, config: NetworkedCacheConfig) -> Self {
        info!(
            "Initializing networked cache (prefix: {}, default_ttl: {:?}, timeout: {:?})",
            config.key_prefix, config.default_ttl, config.timeout
        );

        Self {
            inner: Arc::new(NetworkedInner {
                backend,
                config,
                counters: HitCounters::default(),
                reachable: AtomicBool::new(false),
            }),
        }
    }

    /// Create a Redis-backed networked cache
    ///
    /// Fails only for an invalid configuration or malformed address; an
    /// unreachable server yields a cache that misses until it comes back.
    pub fn connect(config: NetworkedCacheConfig) -> Result<Self> {
        config.validate().map_err(CacheError::ConfigError)?;
        let backend = RedisBackend::new(&config.url, config.timeout)?;
        Ok(Self::new(Arc::new(backend), config))
    }

    /// The configuration this cache was built with
    pub fn config(&self) -> &NetworkedCacheConfig {
        &self.inner.config
    }

    /// Get a payload, `None` on miss or on any backend failure
    pub fn get(&self, key: &str) -> Option<CachePayload> {
        self.get_with_ttl(key).map(|(payload, _)| payload)
    }

    /// Get a payload together with the lifetime its record has left
    ///
    /// The lifetime is `None` for records written without a TTL field.
    pub fn get_with_ttl(&self, key: &str) -> Option<(CachePayload, Option<Duration>)> {
        let hit = self.inner.fetch(key);
        self.inner.counters.record(hit.is_some());
        hit
    }

    /// Store a payload; metadata is read from the payload's `query`/`model` fields
    pub fn set(&self, key: &str, payload: CachePayload, ttl: Option<Duration>) -> bool {
        let metadata = WriteMetadata::from_payload(&payload);
        self.inner.store(key, payload, ttl, metadata)
    }

    /// Store a payload with explicit write-time metadata
    pub fn set_with_metadata(
        &self,
        key: &str,
        payload: CachePayload,
        ttl: Option<Duration>,
        metadata: &WriteMetadata,
    ) -> bool {
        self.inner.store(key, payload, ttl, metadata.clone())
    }

    /// Delete every key in this cache's namespace
    pub fn clear_namespace(&self) -> bool {
        self.inner.clear_namespace()
    }

    /// Hit/miss counters plus a fresh count of remote entries
    pub fn stats(&self) -> NetworkedCacheStats {
        let count = self.inner.remote_entry_count();
        self.inner.stats(count)
    }

    /// Ping the backend and report latency
    pub fn health_check(&self) -> HealthCheckResult {
        self.inner.health_check()
    }

    /// Async variant of [`get`](Self::get)
    pub async fn get_async(&self, key: &str) -> Option<CachePayload> {
        self.get_with_ttl_async(key)
            .await
            .map(|(payload, _)| payload)
    }

    /// Async variant of [`get_with_ttl`](Self::get_with_ttl)
    pub async fn get_with_ttl_async(&self, key: &str) -> Option<(CachePayload, Option<Duration>)> {
        let key = key.to_string();
        let hit = self
            .run_blocking("GET", move |inner| inner.fetch(&key))
            .await;
        self.inner.counters.record(hit.is_some());
        hit
    }

    /// Async variant of [`set`](Self::set)
    pub async fn set_async(&self, key: &str, payload: CachePayload, ttl: Option<Duration>) -> bool {
        let metadata = WriteMetadata::from_payload(&payload);
        self.set_with_metadata_async(key, payload, ttl, &metadata).await
    }

    /// Async variant of [`set_with_metadata`](Self::set_with_metadata)
    pub async fn set_with_metadata_async(
        &self,
        key: &str,
        payload: CachePayload,
        ttl: Option<Duration>,
        metadata: &WriteMetadata,
    ) -> bool {
        let key: CacheKey = key.to_string();
        let metadata = metadata.clone();
        self.run_blocking("SET", move |inner| {
            inner.store(&key, payload, ttl, metadata).then_some(())
        })
        .await
        .is_some()
    }

    /// Async variant of [`clear_namespace`](Self::clear_namespace)
    pub async fn clear_namespace_async(&self) -> bool {
        let cleared = self
            .run_blocking("CLEAR", |inner| inner.clear_namespace().then_some(()))
            .await
            .is_some();
        if !cleared {
            self.inner.reachable.store(false, Ordering::Relaxed);
        }
        cleared
    }

    /// Async variant of [`stats`](Self::stats)
    pub async fn stats_async(&self) -> NetworkedCacheStats {
        let count = self
            .run_blocking("SCAN", |inner| inner.remote_entry_count())
            .await;
        if count.is_none() {
            self.inner.reachable.store(false, Ordering::Relaxed);
        }
        self.inner.stats(count)
    }

    /// Async variant of [`health_check`](Self::health_check)
    pub async fn health_check_async(&self) -> HealthCheckResult {
        let start = Instant::now();
        match self
            .run_blocking("PING", |inner| Some(inner.health_check()))
            .await
        {
            Some(result) => result,
            None => {
                self.inner.reachable.store(false, Ordering::Relaxed);
                HealthCheckResult::unhealthy(start.elapsed(), "health check timed out")
            }
        }
    }

    /// Run an internal operation on the blocking pool under the configured
    /// deadline. A timeout or a panicked task becomes `None`.
    ///
    /// Outside a tokio runtime the operation runs inline on the polling
    /// thread, bounded only by the socket timeouts.
    async fn run_blocking<T, F>(&self, operation: &'static str, f: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(&NetworkedInner) -> Option<T> + Send + 'static,
    {
        if tokio::runtime::Handle::try_current().is_err() {
            debug!("No tokio runtime for networked cache {}; running inline", operation);
            return f(self.inner.as_ref());
        }

        let inner = Arc::clone(&self.inner);
        let timeout = inner.config.timeout;
        let task = tokio::task::spawn_blocking(move || f(inner.as_ref()));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!("Networked cache {} task failed: {}", operation, e);
                None
            }
            Err(_) => {
                warn!("Networked cache {} timed out after {:?}", operation, timeout);
                None
            }
        }
    }
}
