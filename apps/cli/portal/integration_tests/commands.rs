use portal::app::App;
use portal::cli::Command;
use portal::commands::run;
use portal::error::PortalError;

use session_core::config::{ApiConfig, ClientConfig};
use session_core::session::LogNotifier;
use session_core::storage::{FileTokenStorage, TokenStorage};
use session_core::{ACCESS_TOKEN_KEY, LOGIN_ENDPOINT, LOGOUT_ENDPOINT, ME_ENDPOINT};

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api: ApiConfig::new(format!("{}/api/v1/", server.uri())),
        ..ClientConfig::default()
    }
}

/// **VALUE**: Tests that a session stored by one invocation is picked up by the next.
///
/// **WHY THIS MATTERS**: Each `portal` command is a separate process. Login is useless
/// unless the next command finds the tokens in the data directory.
///
/// **BUG THIS CATCHES**: Would catch the app wiring in-memory storage, or hydrating the
/// session before the storage path is set.
#[tokio::test]
async fn given_login_in_one_app_when_next_app_starts_then_session_is_restored() {
    // GIVEN: A server accepting login and serving the user for A1
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/{LOGIN_ENDPOINT}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1", "refresh": "R1", "user": { "id": 1, "username": "a" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/{ME_ENDPOINT}")))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "username": "a" })))
        .expect(1)
        .mount(&server)
        .await;
    let data_dir = TempDir::new().expect("temp dir");

    // WHEN: Logging in with one app, then asking a fresh app who is signed in
    let first = App::build(config_for(&server), data_dir.path(), Arc::new(LogNotifier)).expect("app");
    let logged_in = run(
        &first,
        Command::Login {
            username: String::from("a"),
            password: String::from("b"),
        },
    )
    .await
    .expect("login runs");

    let second = App::build(config_for(&server), data_dir.path(), Arc::new(LogNotifier)).expect("app");
    let me = run(&second, Command::Me).await.expect("me runs");

    // THEN: Both succeed and the user came from the stored token
    assert!(logged_in);
    assert!(me);
    assert_eq!(second.store.current_user().map(|u| u.id), Some(1));
}

#[tokio::test]
async fn given_stored_session_when_logout_fails_on_server_then_token_file_is_emptied() {
    // GIVEN: Persisted tokens and a logout endpoint that errors
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/{LOGOUT_ENDPOINT}")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let data_dir = TempDir::new().expect("temp dir");
    let storage = FileTokenStorage::new(data_dir.path());
    storage.set(ACCESS_TOKEN_KEY, "A1").expect("seed");
    storage.set("refresh_token", "R1").expect("seed");

    // WHEN: Running logout
    let app = App::build(config_for(&server), data_dir.path(), Arc::new(LogNotifier)).expect("app");
    let ok = run(&app, Command::Logout).await.expect("logout runs");

    // THEN: Reported as done, and nothing left on disk
    assert!(ok);
    assert_eq!(storage.get(ACCESS_TOKEN_KEY).expect("read"), None);
}

#[tokio::test]
async fn given_no_session_when_navigating_to_protected_page_then_lands_on_login() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().expect("temp dir");
    let app = App::build(config_for(&server), data_dir.path(), Arc::new(LogNotifier)).expect("app");

    let ok = run(
        &app,
        Command::Navigate {
            path: String::from("/chat"),
        },
    )
    .await
    .expect("navigate runs");

    assert!(ok);
    let current = app.router.current().expect("location");
    assert_eq!(current.name, "Login");
    assert_eq!(current.redirect_target(), Some("/chat"));
}

#[tokio::test]
async fn given_missing_avatar_file_when_uploading_then_returns_input_error() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().expect("temp dir");
    let app = App::build(config_for(&server), data_dir.path(), Arc::new(LogNotifier)).expect("app");

    let result = run(
        &app,
        Command::Avatar {
            file: data_dir.path().join("missing.png"),
            mime: None,
        },
    )
    .await;

    assert!(matches!(result, Err(PortalError::Input { .. })));
}

/// **VALUE**: Tests that `portal config` writes the new API URL where the next run reads it.
///
/// **WHY THIS MATTERS**: Pointing the client at another server is the one setting users
/// change by hand; it has to survive into the next process.
///
/// **BUG THIS CATCHES**: Would catch the command editing only the in-memory config, or
/// saving to a directory other than the one `load` reads.
#[tokio::test]
async fn given_config_dir_when_setting_api_url_then_next_load_sees_it() {
    // GIVEN: An app with an empty config directory
    let config_dir = TempDir::new().expect("temp dir");
    let data_dir = TempDir::new().expect("temp dir");
    let app = App::build(ClientConfig::default(), data_dir.path(), Arc::new(LogNotifier))
        .expect("app")
        .with_config_dir(Some(config_dir.path().to_path_buf()));

    // WHEN: Setting the API URL and timeout
    let saved = run(
        &app,
        Command::Config {
            api_url: Some(String::from("https://portal.example.org/api/v1/")),
            timeout_secs: Some(30),
        },
    )
    .await
    .expect("config runs");

    // THEN: A fresh load returns the new values
    assert!(saved);
    let reloaded = ClientConfig::load(config_dir.path()).expect("load");
    assert_eq!(reloaded.api.base_url, "https://portal.example.org/api/v1/");
    assert_eq!(reloaded.api.timeout_secs, 30);
}

#[tokio::test]
async fn given_invalid_timeout_when_saving_config_then_error_and_file_untouched() {
    // GIVEN: An app with an empty config directory
    let config_dir = TempDir::new().expect("temp dir");
    let data_dir = TempDir::new().expect("temp dir");
    let app = App::build(ClientConfig::default(), data_dir.path(), Arc::new(LogNotifier))
        .expect("app")
        .with_config_dir(Some(config_dir.path().to_path_buf()));

    // WHEN: Setting a zero timeout
    let result = run(
        &app,
        Command::Config {
            api_url: None,
            timeout_secs: Some(0),
        },
    )
    .await;

    // THEN: Validation rejects it and nothing was written
    assert!(result.is_err());
    assert_eq!(ClientConfig::load(config_dir.path()).expect("load"), ClientConfig::default());
}

#[tokio::test]
async fn given_no_config_dir_when_running_config_then_input_error() {
    let data_dir = TempDir::new().expect("temp dir");
    let app = App::build(ClientConfig::default(), data_dir.path(), Arc::new(LogNotifier)).expect("app");

    let result = run(
        &app,
        Command::Config {
            api_url: Some(String::from("https://portal.example.org/api/v1/")),
            timeout_secs: None,
        },
    )
    .await;

    assert!(matches!(result, Err(PortalError::Input { .. })));
}
