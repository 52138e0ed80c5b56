//! Key-value backends for the networked tier
//!
//! [`KvBackend`] is the seam between the networked cache and the remote
//! store. Methods are synchronous and must bound every network call by a
//! timeout; the networked cache supplies the async surface on top.

use crate::error::{CacheError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Number of keys requested per SCAN round trip
const SCAN_BATCH: usize = 500;

/// A remote store addressable by string key with server-side TTL
pub trait KvBackend: Send + Sync {
    /// Fetch a value, `None` if absent or expired
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that the backend deletes after `ttl_secs`
    fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Delete keys, returning how many existed
    fn delete(&self, keys: &[String]) -> Result<usize>;

    /// List every key starting with `prefix`
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Round-trip check
    fn ping(&self) -> Result<()>;
}

/// Redis-backed [`KvBackend`]
///
/// Holds at most one idle connection. A call takes it (or dials a new one),
/// and puts it back afterwards unless the call broke it, so the next call
/// reconnects after an outage.
pub struct RedisBackend {
    client: redis::Client,
    timeout: Duration,
    idle: Mutex<Option<redis::Connection>>,
}

impl RedisBackend {
    /// Create a backend for `url`
    ///
    /// Only a malformed address fails here; no connection is attempted until
    /// the first call.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            CacheError::ConfigError(format!("invalid backend address '{}': {}", url, e))
        })?;

        info!("Configured Redis backend at {}", client.get_connection_info().addr);

        Ok(Self {
            client,
            timeout,
            idle: Mutex::new(None),
        })
    }

    fn connect(&self) -> Result<redis::Connection> {
        debug!("Opening Redis connection");
        let conn = self
            .client
            .get_connection_with_timeout(self.timeout)
            .map_err(|e| self.map_error("connect", e))?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        Ok(conn)
    }

    fn with_connection<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut redis::Connection) -> redis::RedisResult<T>,
    ) -> Result<T> {
        let idle = self.idle.lock().take();
        let mut conn = match idle {
            Some(conn) => conn,
            None => self.connect()?,
        };

        match f(&mut conn) {
            Ok(value) => {
                *self.idle.lock() = Some(conn);
                Ok(value)
            }
            Err(e) => {
                if !is_broken(&e) {
                    *self.idle.lock() = Some(conn);
                }
                Err(self.map_error(operation, e))
            }
        }
    }

    fn map_error(&self, operation: &str, e: redis::RedisError) -> CacheError {
        if e.is_timeout() {
            CacheError::TimeoutError {
                timeout_ms: self.timeout.as_millis() as u64,
                context: operation.to_string(),
            }
        } else if e.is_connection_refusal() || e.is_connection_dropped() {
            CacheError::ConnectionError(e.to_string())
        } else {
            CacheError::BackendError(e)
        }
    }
}

fn is_broken(e: &redis::RedisError) -> bool {
    e.is_io_error() || e.is_timeout() || e.is_connection_dropped() || e.is_connection_refusal()
}

/// Escape glob metacharacters so a prefix matches literally in `SCAN MATCH`
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl KvBackend for RedisBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_connection("GET", |conn| redis::cmd("GET").arg(key).query(conn))
    }

    fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.with_connection("SET", |conn| {
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(ttl_secs)
                .query(conn)
        })
    }

    fn delete(&self, keys: &[String]) -> Result<usize> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(key);
        }
        self.with_connection("DEL", |conn| cmd.query(conn))
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("{}*", escape_glob(prefix));

        self.with_connection("SCAN", |conn| {
            let mut keys = Vec::new();
            let mut cursor: u64 = 0;
            loop {
                let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query(&mut *conn)?;
                keys.extend(batch);
                if next == 0 {
                    break;
                }
                cursor = next;
            }
            // SCAN may return a key more than once
            keys.sort_unstable();
            keys.dedup();
            Ok(keys)
        })
    }

    fn ping(&self) -> Result<()> {
        self.with_connection("PING", |conn| {
            redis::cmd("PING").query::<String>(conn).map(|_| ())
        })
    }
}

/// In-process [`KvBackend`] honoring TTLs
///
/// Useful for tests and single-node development where no Redis is running.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((_, deadline)) if Instant::now() >= *deadline => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let deadline = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    fn delete(&self, keys: &[String]) -> Result<usize> {
        let mut entries = self.entries.lock();
        Ok(keys.iter().filter(|k| entries.remove(k.as_str()).is_some()).count())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let entries = self.entries.lock();
        Ok(entries
            .iter()
            .filter(|(key, (_, deadline))| key.starts_with(prefix) && now < *deadline)
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn ping(&self) -> Result<()> {
        Ok(())
    }
}
