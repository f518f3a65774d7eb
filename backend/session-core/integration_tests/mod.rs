// Integration tests drive the public API against wiremock servers.

mod api_client;
mod auth_api;
mod helpers;
mod refresh_race;
mod router_flow;
mod session_store;
