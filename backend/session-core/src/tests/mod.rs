// Unit tests for crate-private behavior and offline paths.
// HTTP round trips against a mock server live in integration_tests/.

mod config;
mod guard;
mod route_table;
mod router;
mod session_state;
mod storage;

use crate::auth_api::AuthApiClient;
use crate::config::ApiConfig;
use crate::router::RouteTable;
use crate::session::SessionState;
use crate::storage::MemoryTokenStorage;
use crate::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

use models::RouteDescriptorBuilder;

use std::sync::Arc;

/// Session over in-memory storage, pointed at an address nothing listens on.
pub(crate) fn offline_state(tokens: &[(&str, &str)]) -> Arc<SessionState> {
    let storage = MemoryTokenStorage::with_entries(tokens.iter().copied());
    let auth_api = AuthApiClient::new(&ApiConfig::new("http://127.0.0.1:9/api/v1/"))
        .expect("valid config");
    Arc::new(SessionState::new(Arc::new(storage), auth_api))
}

pub(crate) fn signed_in_state() -> Arc<SessionState> {
    offline_state(&[(ACCESS_TOKEN_KEY, "A1"), (REFRESH_TOKEN_KEY, "R1")])
}

pub(crate) fn signed_out_state() -> Arc<SessionState> {
    offline_state(&[])
}

/// Small table covering every kind of route: public, protected, guest,
/// parameterized and catch-all.
pub(crate) fn sample_routes() -> RouteTable {
    let routes = vec![
        RouteDescriptorBuilder::default()
            .with_path("/")
            .with_name("Home"),
        RouteDescriptorBuilder::default()
            .with_path("/noticias")
            .with_name("Noticias"),
        RouteDescriptorBuilder::default()
            .with_path("/noticias/:year/:month/:day/:slug")
            .with_name("NewsDetail"),
        RouteDescriptorBuilder::default()
            .with_path("/perfil")
            .with_name("Profile")
            .requires_auth(),
        RouteDescriptorBuilder::default()
            .with_path("/chat")
            .with_name("Chat")
            .requires_auth(),
        RouteDescriptorBuilder::default()
            .with_path("/auth/login")
            .with_name("Login")
            .guest(),
        RouteDescriptorBuilder::default()
            .with_path("/auth/register")
            .with_name("Register")
            .guest(),
        RouteDescriptorBuilder::default()
            .with_path("/:path_match*")
            .with_name("NotFound"),
    ];

    RouteTable::new(
        routes
            .into_iter()
            .map(|builder| builder.build().expect("valid route"))
            .collect(),
    )
    .expect("unique route names")
}
