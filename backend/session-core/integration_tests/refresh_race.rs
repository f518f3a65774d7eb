//! A refresh that is still in flight when the session changes under it.

use crate::helpers::{api_path, harness, signed_in};

use session_core::session::RefreshOutcome;
use session_core::{ACCESS_TOKEN_KEY, LOGIN_ENDPOINT, LOGOUT_ENDPOINT, REFRESH_ENDPOINT, REFRESH_TOKEN_KEY};

use models::Credentials;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SLOW_REFRESH: Duration = Duration::from_millis(300);
const HEAD_START: Duration = Duration::from_millis(50);

async fn mount_slow_refresh(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(api_path(REFRESH_ENDPOINT)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": "A2" }))
                .set_delay(SLOW_REFRESH),
        )
        .mount(server)
        .await;
}

/// **VALUE**: Verifies logout wins over a refresh that answers after it.
///
/// **WHY THIS MATTERS**: A late refresh response written after logout leaves the
/// app signed in with an access token and no refresh token, and persists that
/// token so the next start is signed in too.
///
/// **BUG THIS CATCHES**: Would catch the refresh committing its token without
/// checking that the session it refreshed is still the current one.
#[tokio::test]
async fn given_slow_refresh_when_logging_out_meanwhile_then_session_stays_cleared() {
    // GIVEN: A signed-in session, a slow refresh endpoint and a fast logout
    let server = MockServer::start().await;
    mount_slow_refresh(&server).await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGOUT_ENDPOINT)))
        .respond_with(ResponseTemplate::new(205))
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());

    // WHEN: Logging out while the refresh is waiting for its response
    let (outcome, logout) = tokio::join!(h.state.refresh_access_token(), async {
        tokio::time::sleep(HEAD_START).await;
        h.store.logout().await
    });

    // THEN: The refresh result is discarded and nothing is left behind
    assert!(logout.is_success());
    assert_eq!(outcome, RefreshOutcome::Superseded);
    assert!(!h.state.is_authenticated());
    assert_eq!(h.state.refresh_token(), None);
    assert_eq!(h.stored(ACCESS_TOKEN_KEY), None);
    assert_eq!(h.stored(REFRESH_TOKEN_KEY), None);
}

#[tokio::test]
async fn given_slow_refresh_when_logging_in_meanwhile_then_new_login_tokens_are_kept() {
    // GIVEN: A signed-in session with a slow refresh, and a login for another account
    let server = MockServer::start().await;
    mount_slow_refresh(&server).await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGIN_ENDPOINT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A9",
            "refresh": "R9",
            "user": { "id": 9 }
        })))
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());

    // WHEN: The login completes while the old session's refresh is in flight
    let (outcome, login) = tokio::join!(h.store.refresh_access_token(), async {
        tokio::time::sleep(HEAD_START).await;
        h.store.login(&Credentials::new("b", "c")).await
    });

    // THEN: The login's tokens survive the late refresh response
    assert!(login.is_success());
    assert!(!outcome);
    assert_eq!(h.state.access_token().map(|t| t.as_str().to_string()).as_deref(), Some("A9"));
    assert_eq!(h.stored(ACCESS_TOKEN_KEY).as_deref(), Some("A9"));
    assert_eq!(h.stored(REFRESH_TOKEN_KEY).as_deref(), Some("R9"));
}
