//! Environment-driven configuration
//!
//! [`Settings::from_env`] loads a `.env` file if one exists, then reads the
//! process environment. Unset variables keep their defaults; set but
//! unparseable values are errors.

use crate::analyzer::{ComplexityLevel, TierProfiles};
use crate::cache::config::{LocalCacheConfig, NetworkedCacheConfig};
use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub const ENV_LOCAL_MAX_ENTRIES: &str = "QUERY_CACHE_MAX_ENTRIES";
pub const ENV_LOCAL_TTL_SECONDS: &str = "QUERY_CACHE_TTL_SECONDS";
pub const ENV_NETWORKED_TTL_SECONDS: &str = "REDIS_CACHE_TTL_SECONDS";
pub const ENV_REDIS_URL: &str = "REDIS_URL";
pub const ENV_REDIS_TIMEOUT_MS: &str = "REDIS_TIMEOUT_MS";
pub const ENV_NETWORKED_ENABLED: &str = "REDIS_CACHE_ENABLED";

/// Model override variable for each tier
const ENV_TIER_MODELS: [(ComplexityLevel, &str); 4] = [
    (ComplexityLevel::Simple, "QUERY_MODEL_SIMPLE"),
    (ComplexityLevel::Medium, "QUERY_MODEL_MEDIUM"),
    (ComplexityLevel::Complex, "QUERY_MODEL_COMPLEX"),
    (ComplexityLevel::Research, "QUERY_MODEL_RESEARCH"),
];

/// Complete configuration for the analyzer and both cache tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub local: LocalCacheConfig,
    pub networked: NetworkedCacheConfig,
    pub profiles: TierProfiles,

    /// Whether to build the networked tier at all
    pub networked_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            local: LocalCacheConfig::default(),
            networked: NetworkedCacheConfig::default(),
            profiles: TierProfiles::default(),
            networked_enabled: true,
        }
    }
}

impl Settings {
    /// Load settings from `.env` and the process environment
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(max_entries) = parse_var(&lookup, ENV_LOCAL_MAX_ENTRIES)? {
            settings.local.max_entries = max_entries;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_LOCAL_TTL_SECONDS)? {
            settings.local.default_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_NETWORKED_TTL_SECONDS)? {
            settings.networked.default_ttl = Duration::from_secs(secs);
        }
        if let Some(url) = lookup(ENV_REDIS_URL) {
            settings.networked.url = url;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_REDIS_TIMEOUT_MS)? {
            settings.networked.timeout = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup(ENV_NETWORKED_ENABLED) {
            settings.networked_enabled = parse_bool(ENV_NETWORKED_ENABLED, &raw)?;
        }

        for (level, name) in ENV_TIER_MODELS {
            if let Some(model) = lookup(name) {
                settings.profiles = settings.profiles.with_model(level, model.trim());
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Validate every section
    ///
    /// The networked section is only checked when that tier is enabled.
    pub fn validate(&self) -> Result<()> {
        self.local
            .validate()
            .map_err(|e| CacheError::ConfigError(format!("local cache: {}", e)))?;

        if self.networked_enabled {
            self.networked
                .validate()
                .map_err(|e| CacheError::ConfigError(format!("networked cache: {}", e)))?;
        }

        self.profiles
            .validate()
            .map_err(|e| CacheError::ConfigError(format!("tier profiles: {}", e)))
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            CacheError::ConfigError(format!("{} has invalid value '{}': {}", name, raw, e))
        }),
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CacheError::ConfigError(format!(
            "{} has invalid value '{}': expected true or false",
            name, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.local.max_entries, 1000);
        assert_eq!(settings.networked.url, "redis://localhost:6379/0");
        assert_eq!(settings.networked.timeout, Duration::from_millis(2000));
        assert!(settings.networked_enabled);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("QUERY_CACHE_MAX_ENTRIES", "50"),
            ("QUERY_CACHE_TTL_SECONDS", "120"),
            ("REDIS_CACHE_TTL_SECONDS", "7200"),
            ("REDIS_URL", "redis://cache:6380/1"),
            ("REDIS_TIMEOUT_MS", "500"),
            ("REDIS_CACHE_ENABLED", "false"),
            ("QUERY_MODEL_RESEARCH", "o1"),
        ]))
        .unwrap();

        assert_eq!(settings.local.max_entries, 50);
        assert_eq!(settings.local.default_ttl, Duration::from_secs(120));
        assert_eq!(settings.networked.default_ttl, Duration::from_secs(7200));
        assert_eq!(settings.networked.url, "redis://cache:6380/1");
        assert_eq!(settings.networked.timeout, Duration::from_millis(500));
        assert!(!settings.networked_enabled);
        assert_eq!(settings.profiles.research.model, "o1");
        assert_eq!(settings.profiles.simple.model, "gpt-4o-mini");
    }

    #[test]
    fn test_unparseable_values_are_config_errors() {
        let result = Settings::from_lookup(lookup_from(&[("QUERY_CACHE_MAX_ENTRIES", "lots")]));
        assert!(matches!(result, Err(CacheError::ConfigError(_))));

        let result = Settings::from_lookup(lookup_from(&[("REDIS_CACHE_ENABLED", "maybe")]));
        assert!(matches!(result, Err(CacheError::ConfigError(_))));
    }

    #[test]
    fn test_validation_runs_after_loading() {
        let result = Settings::from_lookup(lookup_from(&[("QUERY_CACHE_MAX_ENTRIES", "0")]));
        assert!(matches!(result, Err(CacheError::ConfigError(_))));

        let result = Settings::from_lookup(lookup_from(&[("QUERY_MODEL_SIMPLE", "  ")]));
        assert!(matches!(result, Err(CacheError::ConfigError(_))));
    }

    #[test]
    fn test_disabled_networked_tier_skips_its_validation() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("REDIS_CACHE_ENABLED", "0"),
            ("REDIS_TIMEOUT_MS", "0"),
        ]))
        .unwrap();
        assert!(!settings.networked_enabled);

        let result = Settings::from_lookup(lookup_from(&[("REDIS_TIMEOUT_MS", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}
