//! Wiring: one session stack per process.

use crate::error::PortalError;
use crate::routes::portal_routes;

use session_core::api_client::ApiClient;
use session_core::auth_api::AuthApiClient;
use session_core::config::ClientConfig;
use session_core::error::CoreError;
use session_core::router::Router;
use session_core::session::{Notifier, SessionState, SessionStore};
use session_core::storage::{FileTokenStorage, TokenStorage};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

pub struct App {
    pub config: ClientConfig,
    /// Where `config.json` is read from and saved to, when known.
    pub config_dir: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub store: SessionStore,
    pub router: Arc<Router>,
}

impl App {
    /// Build the stack over file-backed token storage in `data_dir`.
    ///
    /// The session is hydrated from `tokens.json` before anything else runs.
    pub fn build(
        config: ClientConfig,
        data_dir: &Path,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, PortalError> {
        let storage: Arc<dyn TokenStorage> = Arc::new(FileTokenStorage::new(data_dir));
        Self::with_storage(config, data_dir, storage, notifier)
    }

    pub fn with_storage(
        config: ClientConfig,
        data_dir: &Path,
        storage: Arc<dyn TokenStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, PortalError> {
        debug!("API base URL: {}", config.api.base_url);

        let auth_api = AuthApiClient::new(&config.api).map_err(CoreError::from)?;
        let state = Arc::new(SessionState::new(storage, auth_api));
        let router = Arc::new(Router::new(portal_routes()?, state.clone()).map_err(CoreError::from)?);
        let api = ApiClient::new(&config.api, state.clone(), router.clone()).map_err(CoreError::from)?;
        let store = SessionStore::new(state, api, notifier);

        info!(
            "Session stack ready (authenticated: {})",
            store.is_authenticated()
        );

        Ok(Self {
            config,
            config_dir: None,
            data_dir: data_dir.to_path_buf(),
            store,
            router,
        })
    }

    pub fn with_config_dir(mut self, config_dir: Option<PathBuf>) -> Self {
        self.config_dir = config_dir;
        self
    }
}
