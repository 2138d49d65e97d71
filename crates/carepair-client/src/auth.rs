//! Authenticated client with single-shot token refresh
//!
//! Every request goes out with the stored access token as a bearer credential.
//! When the server answers 401 the client refreshes the token once, using the
//! stored refresh token, and replays the request once. A replayed request is
//! marked and is never refreshed again.
//!
//! Refreshes are single-flight: requests that fail together while the token is
//! expiring wait on one refresh instead of each sending their own.

use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};
use storage::TokenStore;
use tokio::sync::Mutex;

use crate::endpoints;
use crate::http::{ApiClient, ApiRequest, ApiResponse};
use crate::types::{RefreshRequest, RefreshResponse};
use crate::Result;

/// Session events raised by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The access token was refreshed and stored
    Refreshed,
    /// The refresh failed and stored credentials were deleted
    Expired,
}

/// Callback for session events
pub type SessionCallback = Arc<dyn Fn(SessionEvent) + Send + Sync>;

enum RefreshOutcome {
    /// A usable access token, either freshly issued or refreshed by another caller
    Token(String),
    /// No refresh token stored; nothing was attempted
    Unavailable,
    /// The refresh was attempted and failed; credentials are gone
    Failed,
}

/// Client that attaches bearer tokens and refreshes them on 401
pub struct AuthenticatedClient {
    http: ApiClient,
    tokens: Arc<dyn TokenStore>,
    refresh_lock: Mutex<()>,
    session_callback: RwLock<Option<SessionCallback>>,
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient").field("http", &self.http).finish_non_exhaustive()
    }
}

impl AuthenticatedClient {
    /// Wrap a raw client with the given token store
    pub fn new(http: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            tokens,
            refresh_lock: Mutex::new(()),
            session_callback: RwLock::new(None),
        }
    }

    /// Set a callback for session events
    ///
    /// Replaces any previously registered callback.
    pub fn set_session_callback<F>(&self, callback: F)
    where
        F: Fn(SessionEvent) + Send + Sync + 'static,
    {
        if let Ok(mut slot) = self.session_callback.write() {
            *slot = Some(Arc::new(callback));
        }
    }

    /// The token store this client reads from and writes to
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// The underlying raw client
    pub fn http(&self) -> &ApiClient {
        &self.http
    }

    /// Send a request with credentials, refreshing once on 401
    pub async fn send<T>(&self, request: ApiRequest) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let token = self.stored_access_token().await;

        match self.http.execute::<T>(&request, token.as_deref()).await {
            Err(err) if err.is_unauthorized() && !request.retried => {
                match self.refresh_access_token(token.as_deref()).await {
                    RefreshOutcome::Token(fresh) => {
                        let mut replay = request;
                        replay.retried = true;
                        self.http.execute(&replay, Some(&fresh)).await
                    }
                    RefreshOutcome::Unavailable | RefreshOutcome::Failed => Err(err),
                }
            }
            other => other,
        }
    }

    /// Read the access token; storage failures leave the request unauthenticated
    async fn stored_access_token(&self) -> Option<String> {
        match self.tokens.access_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "token storage not ready; sending request without credentials");
                None
            }
        }
    }

    /// Obtain a fresh access token after `stale` was rejected
    async fn refresh_access_token(&self, stale: Option<&str>) -> RefreshOutcome {
        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(current) = self.stored_access_token().await {
            if Some(current.as_str()) != stale {
                tracing::debug!("access token already refreshed by a concurrent request");
                return RefreshOutcome::Token(current);
            }
        }

        let refresh = match self.tokens.refresh_token().await {
            Ok(Some(refresh)) => refresh,
            Ok(None) => return RefreshOutcome::Unavailable,
            Err(e) => {
                tracing::error!(error = %e, "could not read refresh token");
                self.expire().await;
                return RefreshOutcome::Failed;
            }
        };

        match self.request_refresh(&refresh).await {
            Ok(response) => {
                let next_refresh = response.refresh.unwrap_or(refresh);
                if let Err(e) = self.tokens.set_tokens(&response.access, &next_refresh).await {
                    tracing::error!(error = %e, "could not store refreshed tokens");
                    self.expire().await;
                    return RefreshOutcome::Failed;
                }
                tracing::info!("access token refreshed");
                self.notify(SessionEvent::Refreshed);
                RefreshOutcome::Token(response.access)
            }
            Err(e) => {
                tracing::error!(error = %e, "session expired; token refresh failed");
                self.expire().await;
                RefreshOutcome::Failed
            }
        }
    }

    /// Refresh goes through the raw client: no bearer, no recursion
    async fn request_refresh(&self, refresh: &str) -> Result<RefreshResponse> {
        let request = ApiRequest::post(endpoints::TOKEN_REFRESH)
            .json_body(&RefreshRequest { refresh: refresh.to_string() })?;
        let response = self.http.execute::<RefreshResponse>(&request, None).await?;
        Ok(response.data)
    }

    async fn expire(&self) {
        if let Err(e) = self.tokens.clear_tokens().await {
            tracing::warn!(error = %e, "could not clear stored tokens");
        }
        self.notify(SessionEvent::Expired);
    }

    fn notify(&self, event: SessionEvent) {
        let callback = match self.session_callback.read() {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ApiClientConfig;
    use async_trait::async_trait;
    use mockall::mock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::{KvError, MemoryTokenStore};

    mock! {
        pub Store {}

        #[async_trait]
        impl TokenStore for Store {
            async fn access_token(&self) -> storage::Result<Option<String>>;
            async fn refresh_token(&self) -> storage::Result<Option<String>>;
            async fn set_tokens(&self, access: &str, refresh: &str) -> storage::Result<()>;
            async fn clear_tokens(&self) -> storage::Result<()>;
        }
    }

    fn client_with(tokens: Arc<dyn TokenStore>) -> AuthenticatedClient {
        // Nothing listens here; requests fail fast as network errors
        let http = ApiClient::new(ApiClientConfig::new("http://127.0.0.1:9")).unwrap();
        AuthenticatedClient::new(http, tokens)
    }

    #[tokio::test]
    async fn test_storage_failure_sends_without_token() {
        let mut store = MockStore::new();
        store
            .expect_access_token()
            .returning(|| Err(KvError::InvalidKey("storage not ready".to_string())));

        let client = client_with(Arc::new(store));
        assert!(client.stored_access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_skipped_when_token_already_rotated() {
        let store = Arc::new(MemoryTokenStore::with_tokens("rotated", "refresh"));
        let client = client_with(store);

        match client.refresh_access_token(Some("stale")).await {
            RefreshOutcome::Token(token) => assert_eq!(token, "rotated"),
            _ => panic!("expected the already-rotated token"),
        }
    }

    #[tokio::test]
    async fn test_refresh_unavailable_without_refresh_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let client = client_with(store);

        assert!(matches!(client.refresh_access_token(None).await, RefreshOutcome::Unavailable));
    }

    #[tokio::test]
    async fn test_refresh_network_failure_clears_tokens_and_notifies() {
        let store = Arc::new(MemoryTokenStore::with_tokens("stale", "refresh"));
        let client = client_with(store.clone());

        let expired = Arc::new(AtomicUsize::new(0));
        let counter = expired.clone();
        client.set_session_callback(move |event| {
            if event == SessionEvent::Expired {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        assert!(matches!(client.refresh_access_token(Some("stale")).await, RefreshOutcome::Failed));
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
        assert_eq!(expired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_token_read_failure_expires_session() {
        let mut store = MockStore::new();
        store.expect_access_token().returning(|| Ok(Some("stale".to_string())));
        store
            .expect_refresh_token()
            .returning(|| Err(KvError::InvalidKey("corrupt".to_string())));
        store.expect_clear_tokens().times(1).returning(|| Ok(()));

        let client = client_with(Arc::new(store));
        assert!(matches!(client.refresh_access_token(Some("stale")).await, RefreshOutcome::Failed));
    }
}
