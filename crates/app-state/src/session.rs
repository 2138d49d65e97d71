//! Session context
//!
//! `SessionContext` owns the current user for the lifetime of the app. Screens
//! read it, route guards subscribe to it, and the authenticated client clears
//! it when a token refresh fails.

use carepair_client::{
    AuthResponse, CarePairApi, LoginRequest, Registration, Role, SessionEvent, User,
};
use serde::Serialize;
use std::sync::Arc;
use storage::TokenStore;
use tokio::sync::watch;

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The API call failed
    #[error(transparent)]
    Api(#[from] carepair_client::Error),

    /// Tokens could not be persisted
    #[error("Token storage error: {0}")]
    Storage(#[from] storage::KvError),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Observable authentication state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthState {
    /// Signed-in user, if any
    pub user: Option<User>,
    /// True until startup rehydration has finished
    pub loading: bool,
}

impl AuthState {
    /// Role of the signed-in user
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, loading: true }
    }
}

/// Owner of the single current-user value
///
/// The context starts out loading. Call [`SessionContext::restore`] once at
/// startup to rehydrate a persisted session and clear the flag.
pub struct SessionContext {
    api: CarePairApi,
    state: Arc<watch::Sender<AuthState>>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").field("state", &*self.state.borrow()).finish()
    }
}

impl SessionContext {
    /// Create a context over the given API
    ///
    /// Registers itself as the client's session callback so an expired
    /// session signs the user out.
    pub fn new(api: CarePairApi) -> Self {
        let (sender, _) = watch::channel(AuthState::default());
        let state = Arc::new(sender);

        let on_event = Arc::clone(&state);
        api.client().set_session_callback(move |event| {
            if event == SessionEvent::Expired {
                let cleared = on_event.send_if_modified(|state| state.user.take().is_some());
                if cleared {
                    tracing::info!("session expired; signed out");
                }
            }
        });

        Self { api, state }
    }

    /// The API this context signs in against
    pub fn api(&self) -> &CarePairApi {
        &self.api
    }

    /// Sign in with email and password
    ///
    /// On failure the current state is left as it was.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<User> {
        let response = self.api.login(credentials).await?;
        self.start_session(response).await
    }

    /// Create an account and sign in as it
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let response = self.api.register(registration).await?;
        self.start_session(response).await
    }

    /// Sign out
    ///
    /// The server is told first; its answer does not matter. Local tokens and
    /// the user are always cleared.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "server logout failed; clearing local session anyway");
        }
        self.clear_tokens().await;
        self.state.send_modify(|state| state.user = None);
        tracing::info!("signed out");
    }

    /// Rehydrate a persisted session at startup
    ///
    /// Never fails: any problem leaves the app signed out with no stored
    /// tokens.
    pub async fn restore(&self) {
        self.state.send_modify(|state| state.loading = true);

        let user = match self.api.client().tokens().access_token().await {
            Ok(Some(_)) => match self.api.current_user().await {
                Ok(user) => {
                    tracing::info!(user_id = user.id, role = %user.role, "session restored");
                    Some(user)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored session is no longer valid");
                    self.clear_tokens().await;
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored tokens");
                self.clear_tokens().await;
                None
            }
        };

        self.state.send_modify(|state| {
            state.user = user;
            state.loading = false;
        });
    }

    /// Current user, if signed in
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Whether startup rehydration is still running
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Snapshot of the full state
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Watch the state for changes
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    async fn start_session(&self, response: AuthResponse) -> Result<User> {
        let AuthResponse { user, tokens } = response;
        self.api.client().tokens().set_tokens(&tokens.access, &tokens.refresh).await?;

        tracing::info!(user_id = user.id, role = %user.role, "signed in");
        self.state.send_modify(|state| state.user = Some(user.clone()));
        Ok(user)
    }

    async fn clear_tokens(&self) {
        if let Err(e) = self.api.client().tokens().clear_tokens().await {
            tracing::warn!(error = %e, "could not clear stored tokens");
        }
    }
}
