//! Configuration for the local and networked cache tiers

use crate::cache::key::DEFAULT_KEY_PREFIX;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default address of the networked backend for local development
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";

/// Configuration for the in-process tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalCacheConfig {
    /// Maximum number of entries before the oldest is evicted
    pub max_entries: usize,

    /// Lifetime of entries written without an explicit TTL
    pub default_ttl: Duration,
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            default_ttl: Duration::from_secs(3600),
        }
    }
}

impl LocalCacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> LocalCacheConfigBuilder {
        LocalCacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }

        if self.default_ttl.is_zero() {
            return Err("default_ttl must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Builder for [`LocalCacheConfig`]
#[derive(Debug, Default)]
pub struct LocalCacheConfigBuilder {
    max_entries: Option<usize>,
    default_ttl: Option<Duration>,
}

impl LocalCacheConfigBuilder {
    /// Set maximum number of cache entries
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Set default TTL for cache entries
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn build(self) -> LocalCacheConfig {
        let defaults = LocalCacheConfig::default();

        LocalCacheConfig {
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            default_ttl: self.default_ttl.unwrap_or(defaults.default_ttl),
        }
    }
}

/// Configuration for the networked tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkedCacheConfig {
    /// Backend address
    pub url: String,

    /// Server-side lifetime of entries written without an explicit TTL
    pub default_ttl: Duration,

    /// Upper bound for every network call (connect, read, write)
    pub timeout: Duration,

    /// Namespace shared by every key this cache writes
    pub key_prefix: String,

    /// Ping latency above which the backend is reported as degraded
    pub degraded_threshold: Duration,
}

impl Default for NetworkedCacheConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            default_ttl: Duration::from_secs(3600),
            timeout: Duration::from_secs(2),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            degraded_threshold: Duration::from_millis(250),
        }
    }
}

impl NetworkedCacheConfig {
    pub fn builder() -> NetworkedCacheConfigBuilder {
        NetworkedCacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("url must not be empty".to_string());
        }

        // The backend stores TTLs in whole seconds
        if self.default_ttl.as_secs() == 0 {
            return Err("default_ttl must be at least one second".to_string());
        }

        if self.timeout.is_zero() {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.key_prefix.is_empty() {
            return Err("key_prefix must not be empty".to_string());
        }

        Ok(())
    }
}

/// Builder for [`NetworkedCacheConfig`]
#[derive(Debug, Default)]
pub struct NetworkedCacheConfigBuilder {
    url: Option<String>,
    default_ttl: Option<Duration>,
    timeout: Option<Duration>,
    key_prefix: Option<String>,
    degraded_threshold: Option<Duration>,
}

impl NetworkedCacheConfigBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn degraded_threshold(mut self, threshold: Duration) -> Self {
        self.degraded_threshold = Some(threshold);
        self
    }

    pub fn build(self) -> NetworkedCacheConfig {
        let defaults = NetworkedCacheConfig::default();

        NetworkedCacheConfig {
            url: self.url.unwrap_or(defaults.url),
            default_ttl: self.default_ttl.unwrap_or(defaults.default_ttl),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            key_prefix: self.key_prefix.unwrap_or(defaults.key_prefix),
            degraded_threshold: self
                .degraded_threshold
                .unwrap_or(defaults.degraded_threshold),
        }
    }
}
