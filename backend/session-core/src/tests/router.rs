use super::{sample_routes, signed_in_state, signed_out_state};
use crate::api_client::LoginRedirect;
use crate::error::RouterError;
use crate::router::{RouteNames, RouteTable, Router};

use models::RouteDescriptorBuilder;

/// **VALUE**: Verifies that every protected route, visited without a session, ends
/// on the login route with the requested path in `redirect`.
///
/// **BUG THIS CATCHES**: Would catch the router committing the protected location
/// anyway, or encoding the return target so it no longer round-trips.
#[test]
fn given_no_session_when_navigating_to_protected_routes_then_lands_on_login_with_redirect() {
    // GIVEN: A router without a session
    let router = Router::new(sample_routes(), signed_out_state()).expect("router");

    for target in ["/perfil", "/chat", "/perfil?tab=security"] {
        // WHEN: Navigating to a protected route
        let location = router.navigate(target).expect("navigation");

        // THEN: Login, remembering the requested path
        assert_eq!(location.name, "Login");
        assert_eq!(location.path, "/auth/login");
        assert_eq!(location.redirect_target(), Some(target));
        assert_eq!(router.current(), Some(location));
    }
}

#[test]
fn given_session_when_navigating_to_guest_routes_then_lands_home() {
    let router = Router::new(sample_routes(), signed_in_state()).expect("router");

    for target in ["/auth/login", "/auth/register"] {
        let location = router.navigate(target).expect("navigation");

        assert_eq!(location.name, "Home");
        assert_eq!(location.full_path, "/");
        assert!(location.query.is_empty());
    }
}

#[test]
fn given_session_when_navigating_to_protected_route_then_proceeds() {
    let router = Router::new(sample_routes(), signed_in_state()).expect("router");

    let location = router.navigate("/perfil").expect("navigation");

    assert_eq!(location.name, "Profile");
    assert_eq!(location.full_path, "/perfil");
}

#[test]
fn given_query_string_when_navigating_then_query_and_params_are_parsed() {
    let router = Router::new(sample_routes(), signed_out_state()).expect("router");

    let location = router
        .navigate("/noticias/2024/05/17/feria?ref=home")
        .expect("navigation");

    assert_eq!(location.name, "NewsDetail");
    assert_eq!(location.params["slug"], "feria");
    assert_eq!(location.query["ref"], "home");
    assert_eq!(location.full_path, "/noticias/2024/05/17/feria?ref=home");
}

/// **WHY THIS MATTERS**: Unknown paths must show the not-found view for everyone,
/// never bounce through login or home.
#[test]
fn given_unknown_path_when_navigating_then_shows_not_found_without_redirect() {
    for state in [signed_out_state(), signed_in_state()] {
        let router = Router::new(sample_routes(), state).expect("router");

        let location = router.navigate("/does/not/exist").expect("navigation");

        assert_eq!(location.name, "NotFound");
        assert_eq!(location.path, "/does/not/exist");
        assert_eq!(location.redirect_target(), None);
    }
}

#[test]
fn given_table_without_not_found_route_when_navigating_unknown_path_then_errors() {
    // GIVEN: Only login and home
    let table = RouteTable::new(vec![
        RouteDescriptorBuilder::default()
            .with_path("/")
            .with_name("Home")
            .build()
            .expect("valid"),
        RouteDescriptorBuilder::default()
            .with_path("/auth/login")
            .with_name("Login")
            .guest()
            .build()
            .expect("valid"),
    ])
    .expect("table");
    let router = Router::new(table, signed_out_state()).expect("router");

    // WHEN/THEN: Unknown paths are an error
    assert!(matches!(
        router.navigate("/missing"),
        Err(RouterError::NotFound { path, .. }) if path == "/missing"
    ));
    assert_eq!(router.current(), None);
}

#[test]
fn given_table_without_login_route_when_creating_router_then_errors() {
    let table = RouteTable::new(vec![
        RouteDescriptorBuilder::default()
            .with_path("/")
            .with_name("Home")
            .build()
            .expect("valid"),
    ])
    .expect("table");

    let result = Router::new(table, signed_out_state());

    assert!(matches!(result, Err(RouterError::UnknownRoute { name, .. }) if name == "Login"));
}

/// **BUG THIS CATCHES**: A misconfigured table whose login route is itself protected
/// would redirect forever. The router stops after one hop.
#[test]
fn given_protected_login_route_when_redirecting_then_reports_loop() {
    // GIVEN: Login and Home both protected, renamed via RouteNames
    let table = RouteTable::new(vec![
        RouteDescriptorBuilder::default()
            .with_path("/inicio")
            .with_name("Inicio")
            .requires_auth()
            .build()
            .expect("valid"),
        RouteDescriptorBuilder::default()
            .with_path("/entrar")
            .with_name("Entrar")
            .requires_auth()
            .build()
            .expect("valid"),
    ])
    .expect("table");
    let names = RouteNames {
        login: String::from("Entrar"),
        home: String::from("Inicio"),
        not_found: String::from("Perdido"),
    };
    let router = Router::with_names(table, names, signed_out_state()).expect("router");

    // WHEN: Navigating to a protected route
    let result = router.navigate("/inicio");

    // THEN: Redirect loop instead of infinite recursion
    assert!(matches!(result, Err(RouterError::RedirectLoop { .. })));
}

#[test]
fn given_forced_logout_when_redirecting_to_login_then_current_is_login_without_query() {
    // GIVEN: A router sitting on a protected page
    let state = signed_in_state();
    let router = Router::new(sample_routes(), state.clone()).expect("router");
    router.navigate("/perfil").expect("navigation");

    // WHEN: The session ends and the API client sends the app to login
    state.clear_session();
    router.redirect_to_login();

    // THEN: Login, with no return target
    let current = router.current().expect("location");
    assert_eq!(current.name, "Login");
    assert_eq!(current.full_path, "/auth/login");
}
