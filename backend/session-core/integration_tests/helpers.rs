//! Test helpers for session integration tests.
//!
//! This module wires a complete session stack against a wiremock server:
//! - In-memory token storage shared with the test for inspection
//! - Router over a small route table
//! - A notifier that records what the user would have seen

use session_core::api_client::ApiClient;
use session_core::auth_api::AuthApiClient;
use session_core::config::ApiConfig;
use session_core::router::{RouteTable, Router};
use session_core::session::{Notifier, SessionState, SessionStore};
use session_core::storage::{MemoryTokenStorage, TokenStorage};
use session_core::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

use models::RouteDescriptorBuilder;

use std::sync::{Arc, Mutex};

use wiremock::MockServer;

pub const API_PREFIX: &str = "/api/v1/";

/// Full mock path for an endpoint constant.
pub fn api_path(endpoint: &str) -> String {
    format!("{API_PREFIX}{endpoint}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
    Info(String),
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier lock").clone()
    }

    fn push(&self, notice: Notice) {
        self.notices.lock().expect("notifier lock").push(notice);
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(Notice::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notice::Error(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(Notice::Info(message.to_string()));
    }
}

pub struct Harness {
    pub storage: Arc<MemoryTokenStorage>,
    pub state: Arc<SessionState>,
    pub router: Arc<Router>,
    pub api: ApiClient,
    pub store: SessionStore,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key).expect("memory storage")
    }
}

/// Session stack pointed at `base_url`, starting from the given persisted tokens.
pub fn harness_at(base_url: &str, tokens: &[(&str, &str)]) -> Harness {
    harness_with_config(ApiConfig::new(base_url), tokens)
}

pub fn harness_with_config(config: ApiConfig, tokens: &[(&str, &str)]) -> Harness {
    let storage = Arc::new(MemoryTokenStorage::with_entries(tokens.iter().copied()));
    let auth_api = AuthApiClient::new(&config).expect("auth client");
    let state = Arc::new(SessionState::new(storage.clone(), auth_api));
    let router = Arc::new(Router::new(routes(), state.clone()).expect("router"));
    let api = ApiClient::new(&config, state.clone(), router.clone()).expect("api client");
    let notifier = Arc::new(RecordingNotifier::default());
    let store = SessionStore::new(state.clone(), api.clone(), notifier.clone());

    Harness {
        storage,
        state,
        router,
        api,
        store,
        notifier,
    }
}

pub fn harness(server: &MockServer, tokens: &[(&str, &str)]) -> Harness {
    harness_at(&format!("{}{API_PREFIX}", server.uri()), tokens)
}

/// Persisted tokens of a signed-in user: access `A1`, refresh `R1`.
pub fn signed_in() -> [(&'static str, &'static str); 2] {
    [(ACCESS_TOKEN_KEY, "A1"), (REFRESH_TOKEN_KEY, "R1")]
}

/// An address where nothing listens.
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:9/api/v1/";

pub fn routes() -> RouteTable {
    let routes = [
        ("/", "Home", false, false),
        ("/perfil", "Profile", true, false),
        ("/repositorio", "Repositorio", true, false),
        ("/auth/login", "Login", false, true),
        ("/auth/register", "Register", false, true),
        ("/:path_match*", "NotFound", false, false),
    ];

    RouteTable::new(
        routes
            .into_iter()
            .map(|(path, name, protected, guest)| {
                let mut builder = RouteDescriptorBuilder::default()
                    .with_path(path)
                    .with_name(name);
                if protected {
                    builder = builder.requires_auth();
                }
                if guest {
                    builder = builder.guest();
                }
                builder.build().expect("valid route")
            })
            .collect(),
    )
    .expect("route table")
}
