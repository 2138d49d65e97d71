//! Application bootstrap

use anyhow::Context;
use app_state::{AuthState, SessionContext};
use app_ui::{authorize, landing_route, logout_route, Access, Route};
use carepair_client::{ApiClient, AuthenticatedClient, CarePairApi};
use std::sync::Arc;
use storage::{KvConfig, KvStore};

use crate::config::AppConfig;

/// A running client: store, API and session wired together
#[derive(Debug)]
pub struct CarePairApp {
    store: KvStore,
    api: CarePairApi,
    session: Arc<SessionContext>,
}

impl CarePairApp {
    /// Open the store, build the clients and restore any persisted session
    pub async fn bootstrap(config: &AppConfig) -> anyhow::Result<Self> {
        let store = KvStore::new(KvConfig::new(&config.storage_path))
            .with_context(|| format!("failed to open token store at {}", config.storage_path))?;
        Self::with_store(config, store).await
    }

    /// Like [`CarePairApp::bootstrap`], over an already opened store
    pub async fn with_store(config: &AppConfig, store: KvStore) -> anyhow::Result<Self> {
        let http = ApiClient::new(config.api.clone()).context("failed to build HTTP client")?;
        let client = AuthenticatedClient::new(http, Arc::new(store.clone()));
        let api = CarePairApi::new(Arc::new(client));
        let session = Arc::new(SessionContext::new(api.clone()));

        tracing::info!(base_url = %config.api.base_url, "restoring session");
        session.restore().await;

        Ok(Self { store, api, session })
    }

    /// The session shared by all screens
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// The API facade
    pub fn api(&self) -> &CarePairApi {
        &self.api
    }

    /// Snapshot of the session state
    pub fn auth_state(&self) -> AuthState {
        self.session.state()
    }

    /// Screen to open on launch
    pub fn start_route(&self) -> Route {
        match self.session.state().role() {
            Some(role) => landing_route(role),
            None => Route::Landing,
        }
    }

    /// Check a navigation against the current session
    pub fn navigate(&self, route: Route) -> Access {
        authorize(route, &self.session.state())
    }

    /// Sign out and return the screen to show next
    pub async fn logout(&self) -> Route {
        self.session.logout().await;
        logout_route()
    }

    /// Flush the store to disk
    pub fn shutdown(&self) -> anyhow::Result<()> {
        self.store.flush().context("failed to flush token store")?;
        Ok(())
    }
}
