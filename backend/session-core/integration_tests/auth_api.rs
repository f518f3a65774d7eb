use crate::helpers::{API_PREFIX, UNREACHABLE_BASE_URL, api_path};

use session_core::auth_api::AuthApiClient;
use session_core::config::ApiConfig;
use session_core::{LOGIN_ENDPOINT, LOGOUT_ENDPOINT, REFRESH_ENDPOINT, REGISTER_ENDPOINT};

use common::RedactedToken;
use models::{Credentials, NewUser};

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> AuthApiClient {
    AuthApiClient::new(&ApiConfig::new(format!("{}{API_PREFIX}", server.uri()))).expect("client")
}

#[tokio::test]
async fn given_valid_credentials_when_logging_in_then_returns_tokens_and_user() {
    // GIVEN: A login endpoint expecting {a, b}
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGIN_ENDPOINT)))
        .and(body_json(json!({ "username": "a", "password": "b" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1",
            "refresh": "R1",
            "user": { "id": 1, "username": "a" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: Logging in
    let response = client(&server)
        .login(&Credentials::new("a", "b"))
        .await
        .expect("login");

    // THEN: Tokens and user are decoded
    assert_eq!(response.tokens.access, "A1");
    assert_eq!(response.tokens.refresh, "R1");
    assert_eq!(response.user.id, 1);
    assert_eq!(response.user.username.as_deref(), Some("a"));
}

/// **VALUE**: Verifies the auth client never attaches a bearer header on its own.
///
/// **BUG THIS CATCHES**: Would catch the auth client being wired through the
/// intercepted client, where a failing refresh could trigger another refresh.
#[tokio::test]
async fn given_refresh_call_when_sent_then_carries_no_authorization_header() {
    // GIVEN: A refresh endpoint
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(REFRESH_ENDPOINT)))
        .and(body_json(json!({ "refresh": "R1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: Refreshing
    let response = client(&server)
        .refresh(&RedactedToken::new("R1"))
        .await
        .expect("refresh");

    // THEN: New access token, and the request went out without Authorization
    assert_eq!(response.access, "A2");
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn given_logout_when_sent_then_posts_refresh_token_with_explicit_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGOUT_ENDPOINT)))
        .and(header("Authorization", "Bearer A1"))
        .and(body_json(json!({ "refresh_token": "R1" })))
        .respond_with(ResponseTemplate::new(205))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .logout(Some(&RedactedToken::new("A1")), &RedactedToken::new("R1"))
        .await
        .expect("logout");
}

#[tokio::test]
async fn given_registration_when_accepted_then_returns_message_without_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(REGISTER_ENDPOINT)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Check your email",
            "user": { "id": 9, "username": "nuevo" }
        })))
        .mount(&server)
        .await;

    let new_user = NewUser {
        username: String::from("nuevo"),
        email: String::from("nuevo@example.org"),
        password: String::from("s3cret!"),
        password_confirm: String::from("s3cret!"),
        ..NewUser::default()
    };
    let response = client(&server).register(&new_user).await.expect("register");

    assert_eq!(response.message.as_deref(), Some("Check your email"));
    assert_eq!(response.user.map(|u| u.id), Some(9));
}

#[tokio::test]
async fn given_unverified_account_when_logging_in_then_returns_forbidden_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGIN_ENDPOINT)))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "error": "Account pending verification" })),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .login(&Credentials::new("a", "b"))
        .await
        .expect_err("forbidden");

    assert!(err.is_forbidden());
    assert_eq!(err.detail(), Some("Account pending verification"));
}

#[tokio::test]
async fn given_unreachable_server_when_logging_in_then_returns_network_error() {
    let client = AuthApiClient::new(&ApiConfig::new(UNREACHABLE_BASE_URL)).expect("client");

    let err = client
        .login(&Credentials::new("a", "b"))
        .await
        .expect_err("no server");

    assert!(err.is_network(), "expected network error, got {err}");
}
