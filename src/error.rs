//! Error types for cache backends and configuration
//!
//! The analyzer and key deriver are infallible. Cache reads and writes never
//! surface these errors to callers either; they are produced by backends and
//! constructors and collapsed to miss/`false` inside the networked tier.

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum CacheError {
    /// Connection error - backend unreachable or connection dropped
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Operation timeout
    #[error("Operation timed out after {timeout_ms}ms: {context}")]
    TimeoutError { timeout_ms: u64, context: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Redis driver error (wrapper)
    #[error("Redis error: {0}")]
    BackendError(#[from] redis::RedisError),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<String> for CacheError {
    fn from(s: String) -> Self {
        CacheError::Other(s)
    }
}

impl From<&str> for CacheError {
    fn from(s: &str) -> Self {
        CacheError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::SerializationError(e.to_string())
    }
}
