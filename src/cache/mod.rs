//! # Two-Tier Result Cache
//!
//! Memoizes (query, generation parameters) -> response across an in-process
//! tier and an optional networked tier.
//!
//! ## Features
//!
//! - **Deterministic keys**: SHA-256 fingerprints of the normalized query and
//!   its generation parameters, namespaced by prefix
//! - **Bounded local tier**: insertion-order (FIFO) eviction with per-entry TTL
//! - **Networked tier**: server-side TTL through any [`KvBackend`], Redis in
//!   production, with soft failures that degrade to misses
//! - **Sync and async surfaces** over the same client and statistics
//!
//! ## Example
//!
//! ```rust
//! use query_tier::cache::{GenerationParams, LocalCacheConfig, QueryCache};
//! use serde_json::json;
//!
//! let cache = QueryCache::local_only(LocalCacheConfig::default());
//! let params = GenerationParams::new("gpt-4o-mini", 0.1, 2000, "qa");
//!
//! cache.store("What is trading?", &params, json!({"answer": "..."}));
//! assert!(cache.lookup("what is trading?", &params).is_some());
//! ```

pub mod backend;
pub mod config;
pub mod entry;
pub mod facade;
pub mod health;
pub mod key;
pub mod networked;
pub mod store;
pub mod types;

pub use backend::{KvBackend, MemoryBackend, RedisBackend};
pub use config::{
    LocalCacheConfig, LocalCacheConfigBuilder, NetworkedCacheConfig, NetworkedCacheConfigBuilder,
};
pub use entry::CacheEntry;
pub use facade::{QueryCache, QueryCacheStats};
pub use health::{HealthCheckResult, HealthStatus};
pub use key::{derive_key, normalize_query, GenerationParams, KeyDeriver, DEFAULT_KEY_PREFIX};
pub use networked::{NetworkedCache, StoredRecord, WriteMetadata};
pub use store::LocalCache;
pub use types::{CacheKey, CachePayload, CacheStats, NetworkedCacheStats};
