use crate::helpers::{Notice, UNREACHABLE_BASE_URL, api_path, harness, harness_at, signed_in};

use session_core::api_client::UploadFile;
use session_core::session::FailureKind;
use session_core::{
    ACCESS_TOKEN_KEY, AVATAR_ENDPOINT, CHANGE_PASSWORD_ENDPOINT, LOGIN_ENDPOINT, LOGOUT_ENDPOINT,
    ME_ENDPOINT, PROFILE_ENDPOINT, REFRESH_ENDPOINT, REFRESH_TOKEN_KEY, REGISTER_ENDPOINT,
};

use models::{Credentials, NewUser, PasswordChange, User};

use serde_json::json;
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(api_path(LOGIN_ENDPOINT)))
        .and(body_json(json!({ "username": "a", "password": "b" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1",
            "refresh": "R1",
            "user": { "id": 1 }
        })))
        .mount(server)
        .await;
}

/// **VALUE**: The concrete login scenario: `{a, b}` yields `A1`, and the next call
/// to `auth/me/` carries `Bearer A1`.
///
/// **BUG THIS CATCHES**: Would catch tokens stored only in memory (or only in
/// storage), or the main client reading the token from somewhere stale.
#[tokio::test]
async fn given_ok_credentials_when_logging_in_then_me_request_carries_new_token() {
    // GIVEN: Login and me endpoints
    let server = MockServer::start().await;
    mount_login_ok(&server).await;
    Mock::given(method("GET"))
        .and(path(api_path(ME_ENDPOINT)))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "username": "a" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &[]);

    // WHEN: Logging in
    let result = h.store.login(&Credentials::new("a", "b")).await;

    // THEN: Session holds A1 in memory and in storage, user is the server's
    assert!(result.is_success());
    assert!(h.store.is_authenticated());
    assert_eq!(h.stored(ACCESS_TOKEN_KEY).as_deref(), Some("A1"));
    assert_eq!(h.stored(REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
    assert_eq!(h.store.current_user(), Some(User::with_id(1)));
    assert!(!h.store.is_loading());

    // WHEN: Fetching the user
    h.store.fetch_user().await;

    // THEN: The request carried Bearer A1 (mock verifies) and the user was replaced
    assert_eq!(
        h.store.current_user().and_then(|u| u.username),
        Some(String::from("a"))
    );
}

#[tokio::test]
async fn given_signed_in_user_when_logging_out_then_round_trip_ends_signed_out() {
    // GIVEN: A logged-in session
    let server = MockServer::start().await;
    mount_login_ok(&server).await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGOUT_ENDPOINT)))
        .and(header("Authorization", "Bearer A1"))
        .and(body_json(json!({ "refresh_token": "R1" })))
        .respond_with(ResponseTemplate::new(205))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &[]);
    assert!(h.store.login(&Credentials::new("a", "b")).await.is_success());

    // WHEN: Logging out
    let result = h.store.logout().await;

    // THEN: Nothing left, and the user was told
    assert!(result.is_success());
    assert!(!h.store.is_authenticated());
    assert_eq!(h.store.current_user(), None);
    assert_eq!(h.stored(ACCESS_TOKEN_KEY), None);
    assert_eq!(h.stored(REFRESH_TOKEN_KEY), None);
    assert!(matches!(h.notifier.notices().last(), Some(Notice::Info(_))));
}

/// **VALUE**: Verifies logout clears local state when the server cannot be reached.
///
/// **WHY THIS MATTERS**: A user who clicks "sign out" on a dead network must not stay
/// signed in on a shared machine.
#[tokio::test]
async fn given_unreachable_server_when_logging_out_then_local_session_is_still_cleared() {
    // GIVEN: A persisted session and no server
    let h = harness_at(UNREACHABLE_BASE_URL, &signed_in());
    assert!(h.store.is_authenticated());

    // WHEN: Logging out
    let result = h.store.logout().await;

    // THEN: Failure swallowed, session empty
    assert!(result.is_success());
    assert!(!h.store.is_authenticated());
    assert_eq!(h.stored(ACCESS_TOKEN_KEY), None);
    assert_eq!(h.stored(REFRESH_TOKEN_KEY), None);
}

#[tokio::test]
async fn given_server_error_on_logout_when_logging_out_then_local_session_is_still_cleared() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGOUT_ENDPOINT)))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());

    h.store.logout().await;

    assert!(!h.store.is_authenticated());
}

#[tokio::test]
async fn given_unverified_account_when_logging_in_then_failure_is_flagged_as_verification() {
    // GIVEN: Login answers 403
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGIN_ENDPOINT)))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "error": "Account pending verification" })),
        )
        .mount(&server)
        .await;
    let h = harness(&server, &[]);

    // WHEN: Logging in
    let result = h.store.login(&Credentials::new("a", "b")).await;

    // THEN: Distinguishable failure with the server's message, no session
    assert!(result.is_verification_error());
    assert_eq!(result.message(), Some("Account pending verification"));
    assert!(!h.store.is_authenticated());
    assert_eq!(
        h.notifier.notices(),
        vec![Notice::Error(String::from("Account pending verification"))]
    );
}

#[tokio::test]
async fn given_bad_credentials_when_logging_in_then_failure_is_rejected_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGIN_ENDPOINT)))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "No active account found" })),
        )
        .mount(&server)
        .await;
    let h = harness(&server, &[]);

    let result = h.store.login(&Credentials::new("a", "wrong")).await;

    assert_eq!(result.failure_kind(), Some(FailureKind::Rejected));
    assert_eq!(result.message(), Some("No active account found"));
}

#[tokio::test]
async fn given_unreachable_server_when_logging_in_then_failure_uses_generic_message() {
    let h = harness_at(UNREACHABLE_BASE_URL, &[]);

    let result = h.store.login(&Credentials::new("a", "b")).await;

    assert_eq!(result.failure_kind(), Some(FailureKind::Network));
    assert_eq!(result.message(), Some("Could not sign in"));
    assert!(!h.store.is_loading(), "loading flag lowered on failure");
}

/// **WHY THIS MATTERS**: Registration is verification-gated. Storing tokens here would
/// sign in an account the server has not approved yet.
#[tokio::test]
async fn given_accepted_registration_when_registering_then_session_stays_signed_out() {
    // GIVEN: Registration answers with a message only
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(REGISTER_ENDPOINT)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "" })))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &[]);

    // WHEN: Registering
    let result = h
        .store
        .register(&NewUser {
            username: String::from("nuevo"),
            ..NewUser::default()
        })
        .await;

    // THEN: Success with the pending-verification text, still signed out
    assert!(result.is_success());
    assert_eq!(
        result.message(),
        Some("Registration successful. Your account is pending verification.")
    );
    assert!(!h.store.is_authenticated());
    assert_eq!(h.stored(ACCESS_TOKEN_KEY), None);
}

#[tokio::test]
async fn given_duplicate_email_when_registering_then_failure_carries_field_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(REGISTER_ENDPOINT)))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "email": ["A user with that email already exists."] })),
        )
        .mount(&server)
        .await;
    let h = harness(&server, &[]);

    let result = h.store.register(&NewUser::default()).await;

    assert_eq!(result.failure_kind(), Some(FailureKind::Rejected));
    assert_eq!(result.message(), Some("A user with that email already exists."));
}

#[tokio::test]
async fn given_no_access_token_when_fetching_user_then_no_request_is_made() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(ME_ENDPOINT)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let h = harness(&server, &[]);

    h.store.fetch_user().await;
    h.store.check_auth().await;

    assert_eq!(h.store.current_user(), None);
}

/// **VALUE**: Verifies a 401 on a background read recovers silently.
///
/// **BUG THIS CATCHES**: Would catch the store surfacing an error notification for
/// an expired session on a read the user never asked for.
#[tokio::test]
async fn given_expired_session_when_fetching_user_then_tokens_are_cleared_silently() {
    // GIVEN: me and refresh both reject
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(ME_ENDPOINT)))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path(REFRESH_ENDPOINT)))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());

    // WHEN: Fetching the user
    h.store.fetch_user().await;

    // THEN: Signed out, nothing shown to the user
    assert!(!h.store.is_authenticated());
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn given_token_without_cached_user_when_checking_auth_twice_then_fetches_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(ME_ENDPOINT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3 })))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());

    h.store.check_auth().await;
    h.store.check_auth().await;

    assert_eq!(h.store.current_user().map(|u| u.id), Some(3));
}

#[tokio::test]
async fn given_profile_changes_when_updating_then_response_is_merged_into_user() {
    // GIVEN: A cached user and a profile endpoint echoing partial data
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(ME_ENDPOINT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "ana", "bio": "old"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(api_path(PROFILE_ENDPOINT)))
        .and(header("Authorization", "Bearer A1"))
        .and(body_json(json!({ "bio": "Investigadora" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "bio": "Investigadora" })))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());
    h.store.fetch_user().await;

    // WHEN: Updating the bio
    let changes = json!({ "bio": "Investigadora" })
        .as_object()
        .cloned()
        .expect("object");
    let result = h.store.update_profile(&changes).await;

    // THEN: Bio replaced, username kept
    assert!(result.is_success());
    let user = h.store.current_user().expect("user");
    assert_eq!(user.bio.as_deref(), Some("Investigadora"));
    assert_eq!(user.username.as_deref(), Some("ana"));
}

#[tokio::test]
async fn given_wrong_old_password_when_changing_then_failure_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(api_path(CHANGE_PASSWORD_ENDPOINT)))
        .and(body_json(json!({ "old_password": "x", "new_password": "y" })))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "old_password": ["Wrong password."] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());

    let result = h
        .store
        .change_password(&PasswordChange {
            old_password: String::from("x"),
            new_password: String::from("y"),
        })
        .await;

    assert_eq!(result.failure_kind(), Some(FailureKind::Rejected));
    assert_eq!(result.message(), Some("Wrong password."));
    assert!(h.store.is_authenticated(), "a 400 must not end the session");
}

#[tokio::test]
async fn given_image_when_uploading_avatar_then_sends_multipart_and_updates_user() {
    // GIVEN: A cached user and an avatar endpoint
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(ME_ENDPOINT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(api_path(AVATAR_ENDPOINT)))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "avatar": "/media/avatars/1.png",
            "message": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());
    h.store.fetch_user().await;

    // WHEN: Uploading
    let file = UploadFile::new("me.png", vec![0x89, 0x50, 0x4e, 0x47]).with_mime("image/png");
    let result = h.store.upload_avatar(file).await;

    // THEN: Avatar URL cached on the user
    assert!(result.is_success());
    assert_eq!(
        h.store.current_user().and_then(|u| u.avatar),
        Some(String::from("/media/avatars/1.png"))
    );
}

/// **VALUE**: Verifies a multipart upload survives the refresh-and-retry path.
///
/// **BUG THIS CATCHES**: A form consumed by the first attempt cannot be resent. The
/// retry must rebuild it from the raw parts.
#[tokio::test]
async fn given_expired_token_when_uploading_avatar_then_upload_is_retried_after_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(api_path(AVATAR_ENDPOINT)))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(api_path(AVATAR_ENDPOINT)))
        .and(header("Authorization", "Bearer A2"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "avatar": "/media/avatars/1.png" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path(REFRESH_ENDPOINT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());

    let result = h
        .store
        .upload_avatar(UploadFile::new("me.png", vec![1, 2, 3]))
        .await;

    assert!(result.is_success());
}

#[tokio::test]
async fn given_invalid_refresh_token_when_refreshing_through_store_then_returns_false_and_clears() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(REFRESH_ENDPOINT)))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());

    assert!(!h.store.refresh_access_token().await);
    assert_eq!(h.stored(ACCESS_TOKEN_KEY), None);
    assert_eq!(h.stored(REFRESH_TOKEN_KEY), None);
    assert!(!h.store.is_authenticated());
}

#[tokio::test]
async fn given_valid_refresh_token_when_refreshing_through_store_then_keeps_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(REFRESH_ENDPOINT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A9" })))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, &signed_in());

    assert!(h.store.refresh_access_token().await);
    assert_eq!(h.stored(ACCESS_TOKEN_KEY).as_deref(), Some("A9"));
    assert_eq!(h.stored(REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
}

#[tokio::test]
async fn given_session_when_clearing_then_no_request_is_made() {
    let server = MockServer::start().await;
    let h = harness(&server, &signed_in());

    h.store.clear_session();

    assert!(!h.store.is_authenticated());
    assert_eq!(h.stored(ACCESS_TOKEN_KEY), None);
    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty());
}
