use crate::helpers::{api_path, harness, harness_with_config, signed_in};

use session_core::config::ApiConfig;
use session_core::{ACCESS_TOKEN_KEY, LOGOUT_ENDPOINT, ME_ENDPOINT, REFRESH_ENDPOINT};

use std::time::Duration;

use futures_util::future::join_all;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_me(server: &MockServer, bearer: &str, status: u16, expected: u64) {
    let mut response = ResponseTemplate::new(status);
    if status == 200 {
        response = response.set_body_json(json!({ "id": 1, "username": "a" }));
    } else {
        response = response.set_body_json(json!({ "detail": "Token is invalid or expired" }));
    }

    Mock::given(method("GET"))
        .and(path(api_path(ME_ENDPOINT)))
        .and(header("Authorization", format!("Bearer {bearer}").as_str()))
        .respond_with(response)
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_refresh(server: &MockServer, response: ResponseTemplate, expected: u64) {
    Mock::given(method("POST"))
        .and(path(api_path(REFRESH_ENDPOINT)))
        .and(body_json(json!({ "refresh": "R1" })))
        .respond_with(response)
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn given_no_session_when_calling_api_then_sends_no_authorization_header() {
    // GIVEN: A public endpoint and no stored tokens
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("noticias/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &[]);

    // WHEN: Calling it
    let response = h.api.get("noticias/").await.expect("public call");

    // THEN: Request went out unmodified
    assert_eq!(response.text(), "[]");
    let requests = server.received_requests().await.expect("recording enabled");
    assert!(!requests[0].headers.contains_key("authorization"));
}

/// **VALUE**: Verifies the refresh-and-retry protocol on an expired access token.
///
/// **WHY THIS MATTERS**: This is the path every long-lived session takes. The caller
/// must see a plain success and never learn that a refresh happened.
///
/// **BUG THIS CATCHES**: Would catch the retry reusing the old header, refreshing more
/// than once, or resending more than once.
#[tokio::test]
async fn given_expired_access_token_when_calling_api_then_refreshes_once_and_retries_once() {
    // GIVEN: A1 is expired, R1 exchanges for A2
    let server = MockServer::start().await;
    mount_me(&server, "A1", 401, 1).await;
    mount_me(&server, "A2", 200, 1).await;
    mount_refresh(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })),
        1,
    )
    .await;
    let h = harness(&server, &signed_in());

    // WHEN: Calling a protected endpoint
    let response = h.api.get(ME_ENDPOINT).await.expect("retried call succeeds");

    // THEN: Caller gets the retried response, new token is held and persisted
    assert_eq!(response.status().0, 200);
    assert_eq!(h.state.access_token().map(|t| t.as_str().to_string()), Some("A2".into()));
    assert_eq!(h.stored(ACCESS_TOKEN_KEY).as_deref(), Some("A2"));
    assert_eq!(h.router.current(), None, "no redirect on successful refresh");
}

/// **BUG THIS CATCHES**: Without the per-request retry flag, an endpoint that keeps
/// answering 401 after a successful refresh would loop refresh/retry forever.
#[tokio::test]
async fn given_endpoint_that_always_rejects_when_calling_api_then_retries_only_once() {
    // GIVEN: Refresh works, but the endpoint rejects both tokens
    let server = MockServer::start().await;
    mount_me(&server, "A1", 401, 1).await;
    mount_me(&server, "A2", 401, 1).await;
    mount_refresh(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })),
        1,
    )
    .await;
    let h = harness(&server, &signed_in());

    // WHEN: Calling it
    let err = h.api.get(ME_ENDPOINT).await.expect_err("still unauthorized");

    // THEN: The retry's 401 reaches the caller; mocks verify one refresh, two sends
    assert!(err.is_unauthorized());
}

/// **VALUE**: Verifies an invalid refresh token ends the session.
///
/// **BUG THIS CATCHES**: Would catch stale tokens surviving a failed refresh, the
/// redirect to login being skipped, or a second protected call refreshing again.
#[tokio::test]
async fn given_invalid_refresh_token_when_calling_api_then_clears_session_and_redirects_to_login() {
    // GIVEN: Both tokens rejected
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(ME_ENDPOINT)))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token is invalid or expired" })),
        1,
    )
    .await;
    let h = harness(&server, &signed_in());
    h.router.navigate("/perfil").expect("navigation");

    // WHEN: Calling a protected endpoint
    let err = h.api.get(ME_ENDPOINT).await.expect_err("unauthorized");

    // THEN: Original 401, everything cleared, app on the login view
    assert!(err.is_unauthorized());
    assert!(!h.state.is_authenticated());
    assert_eq!(h.stored(ACCESS_TOKEN_KEY), None);
    assert_eq!(h.router.current().map(|l| l.name), Some(String::from("Login")));

    // WHEN: Calling again without a session
    let err = h.api.get(ME_ENDPOINT).await.expect_err("still unauthorized");

    // THEN: No second refresh call (mock expects exactly one)
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn given_logout_endpoint_rejected_when_called_through_api_client_then_no_refresh_is_attempted() {
    // GIVEN: Logout answers 401, refresh must never be called
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGOUT_ENDPOINT)))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, ResponseTemplate::new(200), 0).await;
    let h = harness(&server, &signed_in());

    // WHEN: Posting to logout through the intercepted client
    let err = h
        .api
        .post(LOGOUT_ENDPOINT, &json!({ "refresh_token": "R1" }))
        .await
        .expect_err("unauthorized");

    // THEN: 401 passes straight through, session untouched
    assert!(err.is_unauthorized());
    assert!(h.state.is_authenticated());
}

/// **WHY THIS MATTERS**: When several requests expire at once, each would otherwise
/// refresh on its own and race to overwrite the stored token.
#[tokio::test]
async fn given_concurrent_unauthorized_requests_when_calling_api_then_refreshes_exactly_once() {
    // GIVEN: A slow refresh so every request sees 401 before it completes
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(ME_ENDPOINT)))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_me(&server, "A2", 200, 5).await;
    mount_refresh(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "access": "A2" }))
            .set_delay(Duration::from_millis(300)),
        1,
    )
    .await;
    let h = harness(&server, &signed_in());

    // WHEN: Five requests run concurrently
    let results = join_all((0..5).map(|_| h.api.get(ME_ENDPOINT))).await;

    // THEN: All succeed; the refresh mock verifies a single call on drop
    for result in results {
        result.expect("request succeeds after shared refresh");
    }
}

#[tokio::test]
async fn given_slow_server_when_timeout_elapses_then_returns_network_error() {
    // GIVEN: A one-second timeout and a server that takes two
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("recursos/")))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    let config = ApiConfig::new(format!("{}/api/v1/", server.uri())).with_timeout_secs(1);
    let h = harness_with_config(config, &[]);

    // WHEN: Calling it
    let err = h.api.get("recursos/").await.expect_err("timeout");

    // THEN: Treated as a network failure
    assert!(err.is_network());
    assert_eq!(err.error_category(), "timeout");
}
