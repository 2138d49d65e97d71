//! On-device key-value store
//!
//! A thin layer over sled. Every value is JSON-encoded under a UTF-8 key, so
//! the credential pair and any other small piece of device state can share one
//! database directory.

use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::sync::Arc;
use thiserror::Error;

/// Storage failures
#[derive(Debug, Error)]
pub enum KvError {
    /// sled could not read or write
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// A stored value did not match the requested type
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key rejected before touching the database
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Where and how the store is opened
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Directory sled writes into
    pub path: String,
    /// Page cache size in bytes
    pub cache_capacity: u64,
    /// Compress values on disk
    pub use_compression: bool,
    /// Background flush period; `None` leaves flushing to explicit calls
    pub flush_every_ms: Option<u64>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "carepair_kv.db".to_string(),
            cache_capacity: 8 * 1024 * 1024,
            use_compression: true,
            flush_every_ms: Some(500),
        }
    }
}

impl KvConfig {
    /// Defaults, stored under `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Page cache size in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Turn on-disk compression on or off
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Background flush period
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// Handle to an open store; clones share the same database
#[derive(Clone)]
pub struct KvStore {
    db: Arc<Db>,
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore").field("entries", &self.db.len()).finish()
    }
}

impl KvStore {
    /// Open (or create) the store described by `config`
    pub fn new(config: KvConfig) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression)
            .flush_every_ms(config.flush_every_ms)
            .open()?;
        tracing::debug!(path = %config.path, entries = db.len(), "opened device store");

        Ok(Self { db: Arc::new(db) })
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Decode the value under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.db
            .get(key.as_bytes())?
            .map(|raw| serde_json::from_slice(&raw))
            .transpose()
            .map_err(KvError::from)
    }

    /// Encode `value` under `key`, replacing what was there
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        if key.is_empty() {
            return Err(KvError::InvalidKey("key must not be empty".to_string()));
        }
        self.db.insert(key.as_bytes(), serde_json::to_vec(value)?)?;
        Ok(())
    }

    /// Delete `key`; `true` if something was removed
    pub fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.db.remove(key.as_bytes())?.is_some())
    }

    /// Whether `key` holds a value
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.db.contains_key(key.as_bytes())?)
    }

    /// Delete everything
    pub fn clear(&self) -> Result<()> {
        Ok(self.db.clear()?)
    }

    /// Block until written data is durable
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}
