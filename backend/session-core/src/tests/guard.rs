use crate::router::{NavigationDecision, decide};

use models::RouteMeta;

/// **VALUE**: Verifies protected routes send visitors without a session to login,
/// carrying the exact path they asked for.
///
/// **BUG THIS CATCHES**: Would catch the return path being dropped or truncated
/// (e.g. losing the query string), which strands users on the home page after login.
#[test]
fn given_protected_route_and_no_session_when_deciding_then_redirects_to_login_with_path() {
    // GIVEN: A protected route with a query string
    let full_path = "/perfil?tab=security";

    // WHEN: Deciding without a session
    let decision = decide(&RouteMeta::PROTECTED, false, full_path);

    // THEN: Login with the full path preserved
    assert_eq!(
        decision,
        NavigationDecision::RedirectToLogin {
            redirect: full_path.to_string()
        }
    );
}

#[test]
fn given_guest_route_and_session_when_deciding_then_redirects_home() {
    let decision = decide(&RouteMeta::GUEST, true, "/auth/login");
    assert_eq!(decision, NavigationDecision::RedirectHome);
}

#[test]
fn given_matching_session_state_when_deciding_then_proceeds() {
    assert_eq!(
        decide(&RouteMeta::PROTECTED, true, "/perfil"),
        NavigationDecision::Proceed
    );
    assert_eq!(
        decide(&RouteMeta::GUEST, false, "/auth/login"),
        NavigationDecision::Proceed
    );
    assert_eq!(
        decide(&RouteMeta::PUBLIC, false, "/noticias"),
        NavigationDecision::Proceed
    );
    assert_eq!(
        decide(&RouteMeta::PUBLIC, true, "/noticias"),
        NavigationDecision::Proceed
    );
}

/// **WHY THIS MATTERS**: The rules are checked in order. A route flagged both ways
/// (which the builder refuses, but `RouteMeta` can still express) must behave as
/// protected, never bounce an anonymous visitor home.
#[test]
fn given_route_flagged_protected_and_guest_when_deciding_then_auth_rule_wins() {
    let meta = RouteMeta {
        requires_auth: true,
        guest: true,
    };

    assert!(matches!(
        decide(&meta, false, "/odd"),
        NavigationDecision::RedirectToLogin { .. }
    ));
    assert_eq!(decide(&meta, true, "/odd"), NavigationDecision::RedirectHome);
}
