use crate::helpers::{api_path, harness, signed_in};

use session_core::LOGIN_ENDPOINT;
use session_core::router::REDIRECT_QUERY_KEY;

use models::Credentials;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **VALUE**: End-to-end flow through guard, login and return target.
///
/// **WHY THIS MATTERS**: The router and the session share one state. After a
/// successful login the same router must let the user into the page that sent
/// them to login in the first place.
#[tokio::test]
async fn given_redirect_to_login_when_user_signs_in_then_return_target_is_reachable() {
    // GIVEN: A signed-out visitor bounced off a protected page
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(LOGIN_ENDPOINT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1", "refresh": "R1", "user": { "id": 1 }
        })))
        .mount(&server)
        .await;
    let h = harness(&server, &[]);
    let login = h.router.navigate("/repositorio").expect("navigation");
    let target = login.redirect_target().expect("return target").to_string();
    assert_eq!(login.name, "Login");
    assert_eq!(target, "/repositorio");
    assert!(login.full_path.starts_with("/auth/login?"));
    assert!(login.full_path.contains(REDIRECT_QUERY_KEY));

    // WHEN: Signing in and following the return target
    assert!(h.store.login(&Credentials::new("a", "b")).await.is_success());
    let location = h.router.navigate(&target).expect("navigation");

    // THEN: The protected page opens, and the login page now bounces home
    assert_eq!(location.name, "Repositorio");
    assert_eq!(h.router.navigate("/auth/login").expect("navigation").name, "Home");
}

#[tokio::test]
async fn given_signed_in_session_when_logging_out_then_protected_routes_redirect_again() {
    let server = MockServer::start().await;
    let h = harness(&server, &signed_in());
    assert_eq!(h.router.navigate("/perfil").expect("navigation").name, "Profile");

    h.store.clear_session();

    let location = h.router.navigate("/perfil").expect("navigation");
    assert_eq!(location.name, "Login");
    assert_eq!(location.redirect_target(), Some("/perfil"));
}
