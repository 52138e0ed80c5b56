//! Two-tier cache façade: local first, networked second

use crate::cache::{
    config::LocalCacheConfig,
    key::{GenerationParams, KeyDeriver},
    networked::{NetworkedCache, WriteMetadata},
    store::LocalCache,
    types::{CacheKey, CachePayload, CacheStats, NetworkedCacheStats},
};
use crate::error::Result;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Combined statistics for both tiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCacheStats {
    pub local: CacheStats,
    pub networked: Option<NetworkedCacheStats>,
}

impl fmt::Display for QueryCacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local: {}", self.local)?;
        match &self.networked {
            Some(networked) => write!(f, "; networked: {}", networked),
            None => write!(f, "; networked: disabled"),
        }
    }
}

/// Query result cache over an in-process tier and an optional networked tier
///
/// Reads check the local tier, then the networked tier; a networked hit is
/// copied into the local tier for at most the lifetime its record has left.
/// Writes go to both tiers. The networked tier never makes a call fail.
pub struct QueryCache {
    local: LocalCache,
    networked: Option<NetworkedCache>,
    keys: KeyDeriver,
}

impl QueryCache {
    pub fn new(local: LocalCache, networked: Option<NetworkedCache>) -> Self {
        let keys = match &networked {
            Some(networked) => KeyDeriver::new(networked.config().key_prefix.clone()),
            None => KeyDeriver::default(),
        };

        Self {
            local,
            networked,
            keys,
        }
    }

    /// A cache with only the in-process tier
    pub fn local_only(config: LocalCacheConfig) -> Self {
        Self::new(LocalCache::new(config), None)
    }

    /// Build both tiers from settings
    ///
    /// A malformed backend address is logged and the cache runs local-only.
    /// An invalid local configuration is an error.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let local = LocalCache::new(settings.local.clone());
        if !settings.networked_enabled {
            info!("Networked cache disabled; running local-only");
            return Ok(Self::new(local, None));
        }

        let networked = match NetworkedCache::connect(settings.networked.clone()) {
            Ok(networked) => Some(networked),
            Err(e) => {
                warn!("Networked cache unavailable, running local-only: {}", e);
                None
            }
        };

        Ok(Self::new(local, networked))
    }

    pub fn local(&self) -> &LocalCache {
        &self.local
    }

    pub fn networked(&self) -> Option<&NetworkedCache> {
        self.networked.as_ref()
    }

    /// The deriver used by [`lookup`](Self::lookup) and [`store`](Self::store)
    pub fn key_deriver(&self) -> &KeyDeriver {
        &self.keys
    }

    /// Get a payload from the local tier, then the networked tier
    pub fn get(&self, key: &str) -> Option<CachePayload> {
        if let Some(payload) = self.local.get(key) {
            return Some(payload);
        }

        let (payload, remaining) = self.networked.as_ref()?.get_with_ttl(key)?;
        self.backfill(key, &payload, remaining);
        Some(payload)
    }

    /// Write to both tiers; returns whether the networked write succeeded
    pub fn set(&self, key: &str, payload: CachePayload, ttl: Option<Duration>) -> bool {
        let metadata = WriteMetadata::from_payload(&payload);
        self.write(key, payload, ttl, &metadata)
    }

    /// Look up the cached result for a query under the given parameters
    pub fn lookup(&self, query: &str, params: &GenerationParams) -> Option<CachePayload> {
        self.get(&self.keys.derive(query, params))
    }

    /// Cache the result for a query under the given parameters
    pub fn store(&self, query: &str, params: &GenerationParams, payload: CachePayload) -> bool {
        let key = self.keys.derive(query, params);
        let metadata = WriteMetadata::new(query, params.model.as_str());
        self.write(&key, payload, None, &metadata)
    }

    /// Clear the local tier and this cache's networked namespace
    pub fn clear(&self) -> bool {
        self.local.clear();
        self.networked
            .as_ref()
            .map_or(true, NetworkedCache::clear_namespace)
    }

    pub fn stats(&self) -> QueryCacheStats {
        QueryCacheStats {
            local: self.local.stats(),
            networked: self.networked.as_ref().map(NetworkedCache::stats),
        }
    }

    pub async fn get_async(&self, key: &str) -> Option<CachePayload> {
        if let Some(payload) = self.local.get(key) {
            return Some(payload);
        }

        let (payload, remaining) = self.networked.as_ref()?.get_with_ttl_async(key).await?;
        self.backfill(key, &payload, remaining);
        Some(payload)
    }

    pub async fn set_async(&self, key: &str, payload: CachePayload, ttl: Option<Duration>) -> bool {
        let metadata = WriteMetadata::from_payload(&payload);
        self.write_async(key, payload, ttl, &metadata).await
    }

    pub async fn lookup_async(&self, query: &str, params: &GenerationParams) -> Option<CachePayload> {
        let key = self.keys.derive(query, params);
        self.get_async(&key).await
    }

    pub async fn store_async(
        &self,
        query: &str,
        params: &GenerationParams,
        payload: CachePayload,
    ) -> bool {
        let key = self.keys.derive(query, params);
        let metadata = WriteMetadata::new(query, params.model.as_str());
        self.write_async(&key, payload, None, &metadata).await
    }

    pub async fn clear_async(&self) -> bool {
        self.local.clear();
        match &self.networked {
            Some(networked) => networked.clear_namespace_async().await,
            None => true,
        }
    }

    pub async fn stats_async(&self) -> QueryCacheStats {
        let networked = match &self.networked {
            Some(networked) => Some(networked.stats_async().await),
            None => None,
        };
        QueryCacheStats {
            local: self.local.stats(),
            networked,
        }
    }

    /// Copy a networked hit into the local tier for no longer than the
    /// record has left
    fn backfill(&self, key: &str, payload: &CachePayload, remaining: Option<Duration>) {
        let default_ttl = self.local.config().default_ttl;
        let ttl = remaining.map_or(default_ttl, |remaining| remaining.min(default_ttl));
        if ttl.is_zero() {
            debug!("Networked entry {} has no lifetime left; not backfilling", key);
            return;
        }

        debug!("Backfilling local cache from networked tier: {} (ttl {:?})", key, ttl);
        self.local.set_with_ttl(key.to_string(), payload.clone(), ttl);
    }

    fn write(
        &self,
        key: &str,
        payload: CachePayload,
        ttl: Option<Duration>,
        metadata: &WriteMetadata,
    ) -> bool {
        self.write_local(key, &payload, ttl);
        match &self.networked {
            Some(networked) => networked.set_with_metadata(key, payload, ttl, metadata),
            None => false,
        }
    }

    async fn write_async(
        &self,
        key: &str,
        payload: CachePayload,
        ttl: Option<Duration>,
        metadata: &WriteMetadata,
    ) -> bool {
        self.write_local(key, &payload, ttl);
        match &self.networked {
            Some(networked) => {
                networked
                    .set_with_metadata_async(key, payload, ttl, metadata)
                    .await
            }
            None => false,
        }
    }

    fn write_local(&self, key: &str, payload: &CachePayload, ttl: Option<Duration>) {
        let key: CacheKey = key.to_string();
        match ttl {
            Some(ttl) => self.local.set_with_ttl(key, payload.clone(), ttl),
            None => self.local.set(key, payload.clone()),
        }
    }
}
