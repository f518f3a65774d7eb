use super::{offline_state, signed_in_state, signed_out_state};
use crate::session::{ActionResult, FailureKind, RefreshOutcome};
use crate::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

use models::{TokenPair, User};

use serde_json::{Map, Value, json};

#[test]
fn given_persisted_tokens_when_creating_state_then_session_is_restored() {
    // GIVEN/WHEN: Storage holding both tokens from a previous run
    let state = signed_in_state();

    // THEN: Authenticated, but the user is not fetched yet
    assert!(state.is_authenticated());
    assert_eq!(state.access_token().map(|t| t.as_str().to_string()), Some("A1".into()));
    assert_eq!(state.refresh_token().map(|t| t.as_str().to_string()), Some("R1".into()));
    assert_eq!(state.current_user(), None);
    assert!(!state.is_loading());
}

#[test]
fn given_empty_persisted_access_token_when_creating_state_then_not_authenticated() {
    let state = offline_state(&[(ACCESS_TOKEN_KEY, ""), (REFRESH_TOKEN_KEY, "R1")]);

    assert!(!state.is_authenticated());
}

/// **VALUE**: Verifies refresh without a refresh token gives up without touching the
/// network.
///
/// **BUG THIS CATCHES**: The offline state points at a closed port. If the guard
/// were missing, this test would return `Failed` from a connection error instead.
#[tokio::test]
async fn given_no_refresh_token_when_refreshing_then_returns_without_network_call() {
    // GIVEN: An access token but no refresh token
    let state = offline_state(&[(ACCESS_TOKEN_KEY, "A1")]);

    // WHEN: Refreshing
    let outcome = state.refresh_access_token().await;

    // THEN: Nothing to refresh with, session untouched
    assert_eq!(outcome, RefreshOutcome::NoRefreshToken);
    assert!(!outcome.is_success());
    assert!(state.is_authenticated());
}

/// **WHY THIS MATTERS**: A network failure during refresh is unrecoverable for the
/// session; leaving the stale access token behind would keep the app looking
/// signed in while every call fails.
#[tokio::test]
async fn given_unreachable_server_when_refreshing_then_session_is_cleared() {
    // GIVEN: Both tokens, server unreachable
    let state = signed_in_state();
    state.set_user(Some(User::with_id(1)));

    // WHEN: Refreshing
    let outcome = state.refresh_access_token().await;

    // THEN: Failed and everything is gone
    assert_eq!(outcome, RefreshOutcome::Failed);
    assert!(!state.is_authenticated());
    assert_eq!(state.refresh_token(), None);
    assert_eq!(state.current_user(), None);
}

#[test]
fn given_new_tokens_when_setting_then_memory_reflects_both() {
    let state = signed_out_state();

    state.set_tokens(&TokenPair {
        access: String::from("A2"),
        refresh: String::from("R2"),
    });

    let session = state.snapshot();
    assert!(session.is_authenticated());
    assert_eq!(session.access_token.map(|t| t.as_str().to_string()), Some("A2".into()));
    assert_eq!(session.refresh_token.map(|t| t.as_str().to_string()), Some("R2".into()));
}

#[test]
fn given_cached_user_when_clearing_tokens_then_user_stays() {
    let state = signed_in_state();
    state.set_user(Some(User::with_id(7)));

    state.clear_tokens();

    assert!(!state.is_authenticated());
    assert_eq!(state.current_user().map(|u| u.id), Some(7));
}

#[test]
fn given_cached_user_when_merging_profile_patch_then_only_patched_fields_change() {
    // GIVEN: A cached user with a username
    let state = signed_in_state();
    let mut user = User::with_id(1);
    user.username = Some(String::from("ana"));
    state.set_user(Some(user));

    // WHEN: Merging a partial profile
    let patch: Map<String, Value> = json!({ "bio": "Investigadora", "phone": "555-0100" })
        .as_object()
        .cloned()
        .expect("object");
    state.merge_user(&patch);

    // THEN: New fields applied, old ones kept
    let user = state.current_user().expect("user");
    assert_eq!(user.username.as_deref(), Some("ana"));
    assert_eq!(user.bio.as_deref(), Some("Investigadora"));
    assert_eq!(user.phone.as_deref(), Some("555-0100"));
}

#[test]
fn given_invalid_patch_when_merging_then_cached_user_is_unchanged() {
    let state = signed_in_state();
    state.set_user(Some(User::with_id(1)));

    let patch: Map<String, Value> = json!({ "id": "not-a-number" })
        .as_object()
        .cloned()
        .expect("object");
    state.merge_user(&patch);

    assert_eq!(state.current_user(), Some(User::with_id(1)));
}

#[test]
fn given_loading_guard_when_dropped_then_flag_is_lowered() {
    let state = signed_out_state();

    {
        let _loading = crate::session::LoadingGuard::raise(&state);
        assert!(state.is_loading());
    }

    assert!(!state.is_loading());
}

/// **VALUE**: Verifies overlapping actions keep the loading flag raised until the last ends.
///
/// **WHY THIS MATTERS**: A view showing a spinner would hide it while a second
/// action is still running if the first one to finish lowered the flag.
///
/// **BUG THIS CATCHES**: Would catch a plain boolean flag in place of a count.
#[test]
fn given_overlapping_loading_guards_when_first_drops_then_still_loading() {
    // GIVEN: Two actions in flight
    let state = signed_out_state();
    let first = crate::session::LoadingGuard::raise(&state);
    let second = crate::session::LoadingGuard::raise(&state);

    // WHEN: The first one finishes
    drop(first);

    // THEN: Loading until the second one finishes too
    assert!(state.is_loading());
    assert!(state.snapshot().is_loading);
    drop(second);
    assert!(!state.is_loading());
    assert!(!state.snapshot().is_loading);
}

#[test]
fn given_failure_results_when_inspecting_then_helpers_agree() {
    let unverified = ActionResult::failure("Account pending verification", FailureKind::Unverified);
    let network = ActionResult::failure("Could not sign in", FailureKind::Network);
    let ok = ActionResult::success();

    assert!(unverified.is_verification_error());
    assert_eq!(unverified.message(), Some("Account pending verification"));
    assert!(!network.is_verification_error());
    assert_eq!(network.failure_kind(), Some(FailureKind::Network));
    assert!(ok.is_success());
    assert_eq!(ok.message(), None);
    assert_eq!(ok.failure_kind(), None);
}
