use super::sample_routes;
use crate::error::RouterError;
use crate::router::RouteTable;

use models::RouteDescriptorBuilder;

#[test]
fn given_static_path_when_resolving_then_matches_exact_route() {
    let table = sample_routes();

    let found = table.resolve("/perfil").expect("route");

    assert_eq!(found.route.name, "Profile");
    assert!(found.params.is_empty());
}

#[test]
fn given_root_path_when_resolving_then_matches_home() {
    let table = sample_routes();

    assert_eq!(table.resolve("/").expect("route").route.name, "Home");
}

/// **VALUE**: Verifies `:param` segments capture their values.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one in segment matching that shifts
/// every parameter by one or accepts a path with a missing segment.
#[test]
fn given_parameterized_path_when_resolving_then_captures_params() {
    // GIVEN: The news detail pattern
    let table = sample_routes();

    // WHEN: Resolving a concrete article
    let found = table
        .resolve("/noticias/2024/05/17/nueva-convocatoria")
        .expect("route");

    // THEN: Every segment lands in its parameter
    assert_eq!(found.route.name, "NewsDetail");
    assert_eq!(found.params["year"], "2024");
    assert_eq!(found.params["month"], "05");
    assert_eq!(found.params["day"], "17");
    assert_eq!(found.params["slug"], "nueva-convocatoria");
}

#[test]
fn given_path_missing_a_param_segment_when_resolving_then_falls_to_catch_all() {
    let table = sample_routes();

    let found = table.resolve("/noticias/2024/05").expect("catch-all");

    assert_eq!(found.route.name, "NotFound");
    assert_eq!(found.params["path_match"], "noticias/2024/05");
}

/// **WHY THIS MATTERS**: The not-found route is declared with a pattern that matches
/// everything. If it were tried in declaration order before later routes, any route
/// declared after it would become unreachable.
#[test]
fn given_catch_all_declared_first_when_resolving_then_specific_routes_still_win() {
    // GIVEN: A table whose catch-all comes first
    let table = RouteTable::new(vec![
        RouteDescriptorBuilder::default()
            .with_path("/*")
            .with_name("NotFound")
            .build()
            .expect("valid"),
        RouteDescriptorBuilder::default()
            .with_path("/chat")
            .with_name("Chat")
            .build()
            .expect("valid"),
    ])
    .expect("table");

    // WHEN/THEN: The specific route is still found
    assert_eq!(table.resolve("/chat").expect("route").route.name, "Chat");
    assert_eq!(
        table.resolve("/elsewhere").expect("route").route.name,
        "NotFound"
    );
}

#[test]
fn given_table_without_catch_all_when_resolving_unknown_path_then_returns_none() {
    let table = RouteTable::new(vec![
        RouteDescriptorBuilder::default()
            .with_path("/")
            .with_name("Home")
            .build()
            .expect("valid"),
    ])
    .expect("table");

    assert!(table.resolve("/missing").is_none());
}

#[test]
fn given_trailing_slash_when_resolving_then_matches_same_route() {
    let table = sample_routes();

    assert_eq!(table.resolve("/perfil/").expect("route").route.name, "Profile");
}

#[test]
fn given_duplicate_route_names_when_building_table_then_returns_error() {
    let route = RouteDescriptorBuilder::default()
        .with_path("/")
        .with_name("Home")
        .build()
        .expect("valid");

    let result = RouteTable::new(vec![route.clone(), route]);

    assert!(matches!(result, Err(RouterError::DuplicateRoute { name, .. }) if name == "Home"));
}

#[test]
fn given_route_name_when_looking_up_then_finds_descriptor() {
    let table = sample_routes();

    assert_eq!(table.by_name("Login").expect("login").path, "/auth/login");
    assert!(table.by_name("Missing").is_none());
}
