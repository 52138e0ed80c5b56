//! # Query Tier (query-tier)
//!
//! Complexity-driven configuration selection and a two-tier result cache for
//! language-model query pipelines.
//!
//! ## Features
//!
//! - Four-tier query complexity classification (simple, medium, complex, research)
//! - Per-tier model and retrieval recommendations from a configurable table
//! - Deterministic, namespaced cache keys
//! - Bounded in-process cache with TTL and FIFO eviction
//! - Redis-backed networked cache that never fails a request
//! - Environment-driven settings with `.env` support
//!
//! ## Analyze, then cache
//!
//! ```rust
//! use query_tier::{analyze, GenerationParams, LocalCacheConfig, QueryCache};
//! use serde_json::json;
//!
//! let analysis = analyze("What is trading?");
//! let params = GenerationParams::new(analysis.recommended_model.as_str(), 0.1, 2000, "qa");
//!
//! let cache = QueryCache::local_only(LocalCacheConfig::default());
//! if cache.lookup("What is trading?", &params).is_none() {
//!     let response = json!({"answer": "Buying and selling assets."});
//!     cache.store("What is trading?", &params, response);
//! }
//! assert_eq!(cache.stats().local.misses, 1);
//! ```
//!
//! ## With a networked tier
//!
//! ```no_run
//! use query_tier::{QueryCache, Settings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let cache = QueryCache::from_settings(&settings)?;
//!
//!     if let Some(networked) = cache.networked() {
//!         let health = networked.health_check_async().await;
//!         println!("Backend status: {:?} ({}ms)", health.status, health.response_time_ms);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod cache;
pub mod error;
pub mod settings;

// Re-export main types for convenience
pub use analyzer::{
    analyze, ComplexityAnalyzer, ComplexityLevel, QueryAnalysis, RetrievalParams, TierProfile,
    TierProfiles,
};
pub use cache::{
    derive_key, CacheStats, GenerationParams, HealthCheckResult, HealthStatus, KeyDeriver,
    KvBackend, LocalCache, LocalCacheConfig, MemoryBackend, NetworkedCache, NetworkedCacheConfig,
    NetworkedCacheStats, QueryCache, QueryCacheStats, RedisBackend, WriteMetadata,
};
pub use error::{CacheError, Result};
pub use settings::Settings;
