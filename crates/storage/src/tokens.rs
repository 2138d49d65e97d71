//! Credential storage
//!
//! The session is represented on the device by exactly two strings: the
//! access token and the refresh token. They live under fixed keys and are
//! written together, last write wins.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::kv::{KvStore, Result};

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Persisted access/refresh token pair
///
/// Implementations must be safe to share between the HTTP client and the
/// session context.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the stored access token
    async fn access_token(&self) -> Result<Option<String>>;

    /// Read the stored refresh token
    async fn refresh_token(&self) -> Result<Option<String>>;

    /// Overwrite both tokens
    async fn set_tokens(&self, access: &str, refresh: &str) -> Result<()>;

    /// Delete both tokens
    async fn clear_tokens(&self) -> Result<()>;
}

#[async_trait]
impl TokenStore for KvStore {
    async fn access_token(&self) -> Result<Option<String>> {
        self.get(ACCESS_TOKEN_KEY)
    }

    async fn refresh_token(&self) -> Result<Option<String>> {
        self.get(REFRESH_TOKEN_KEY)
    }

    async fn set_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        self.set(ACCESS_TOKEN_KEY, &access)?;
        self.set(REFRESH_TOKEN_KEY, &refresh)?;
        self.flush()
    }

    async fn clear_tokens(&self) -> Result<()> {
        self.remove(ACCESS_TOKEN_KEY)?;
        self.remove(REFRESH_TOKEN_KEY)?;
        self.flush()
    }
}

/// Process-local token store
///
/// Nothing survives the process; useful for tests and for sessions that
/// should not touch the disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredTokens>,
}

#[derive(Debug, Default)]
struct StoredTokens {
    access: Option<String>,
    refresh: Option<String>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a token pair
    pub fn with_tokens(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            tokens: RwLock::new(StoredTokens {
                access: Some(access.into()),
                refresh: Some(refresh.into()),
            }),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.tokens.read().access.clone())
    }

    async fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.tokens.read().refresh.clone())
    }

    async fn set_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        let mut tokens = self.tokens.write();
        tokens.access = Some(access.to_string());
        tokens.refresh = Some(refresh.to_string());
        Ok(())
    }

    async fn clear_tokens(&self) -> Result<()> {
        let mut tokens = self.tokens.write();
        tokens.access = None;
        tokens.refresh = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::KvConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_starts_empty() {
        let store = MemoryTokenStore::new();
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_set_and_clear() {
        let store = MemoryTokenStore::new();
        store.set_tokens("access-1", "refresh-1").await.unwrap();

        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("refresh-1"));

        store.clear_tokens().await.unwrap();
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = MemoryTokenStore::with_tokens("old-access", "old-refresh");
        store.set_tokens("new-access", "new-refresh").await.unwrap();

        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("new-access"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("new-refresh"));
    }

    #[tokio::test]
    async fn test_kv_store_uses_fixed_keys() {
        let kv = KvStore::in_memory().unwrap();
        kv.set_tokens("a", "r").await.unwrap();

        let access: Option<String> = kv.get(ACCESS_TOKEN_KEY).unwrap();
        let refresh: Option<String> = kv.get(REFRESH_TOKEN_KEY).unwrap();
        assert_eq!(access.as_deref(), Some("a"));
        assert_eq!(refresh.as_deref(), Some("r"));

        kv.clear_tokens().await.unwrap();
        assert!(!kv.contains(ACCESS_TOKEN_KEY).unwrap());
        assert!(!kv.contains(REFRESH_TOKEN_KEY).unwrap());
    }

    #[tokio::test]
    async fn test_kv_tokens_survive_restart() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tokens").to_string_lossy().to_string();

        {
            let kv = KvStore::new(KvConfig::new(&path)).unwrap();
            kv.set_tokens("persisted-access", "persisted-refresh").await.unwrap();
        }

        let kv = KvStore::new(KvConfig::new(&path)).unwrap();
        assert_eq!(kv.access_token().await.unwrap().as_deref(), Some("persisted-access"));
        assert_eq!(kv.refresh_token().await.unwrap().as_deref(), Some("persisted-refresh"));
    }
}
