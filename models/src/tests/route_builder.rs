use crate::{ModelError, RouteDescriptorBuilder, RouteMeta};

/// **VALUE**: Verifies that a route cannot be both protected and guest-only.
///
/// **WHY THIS MATTERS**: The guard checks `requires_auth` before `guest`, so a route with
/// both flags would silently behave as protected. Rejecting it at build time keeps the
/// route table honest.
#[test]
fn given_protected_and_guest_flags_when_building_then_returns_validation_error() {
    // GIVEN: Builder with both flags set
    let builder = RouteDescriptorBuilder::default()
        .with_path("/auth/login")
        .with_name("Login")
        .requires_auth()
        .guest();

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert!(message.contains("cannot be both protected and guest-only"));
        }
        Ok(route) => panic!("Expected validation error, got {route:?}"),
    }
}

#[test]
fn given_missing_name_when_building_then_returns_validation_error() {
    // GIVEN: Builder without a name
    let builder = RouteDescriptorBuilder::default().with_path("/perfil");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Route name is required");
        }
    }
}

#[test]
fn given_relative_path_when_building_then_returns_validation_error() {
    let result = RouteDescriptorBuilder::default()
        .with_path("perfil")
        .with_name("Profile")
        .build();

    assert!(result.is_err(), "Paths must be absolute");
}

/// **BUG THIS CATCHES**: A catch-all in the middle of a pattern would make every
/// following segment unreachable, so the builder refuses it.
#[test]
fn given_catch_all_before_last_segment_when_building_then_returns_validation_error() {
    let result = RouteDescriptorBuilder::default()
        .with_path("/docs/*/edit")
        .with_name("Docs")
        .build();

    assert!(result.is_err());
}

#[test]
fn given_valid_protected_route_when_building_then_defaults_component_to_name() {
    // GIVEN: A protected route without an explicit component
    let route = RouteDescriptorBuilder::default()
        .with_path("/perfil")
        .with_name("Profile")
        .requires_auth()
        .build()
        .expect("valid route");

    // THEN: Component falls back to the name and meta is protected
    assert_eq!(route.component, "Profile");
    assert_eq!(route.meta, RouteMeta::PROTECTED);
    assert!(!route.is_catch_all());
}

#[test]
fn given_named_catch_all_when_building_then_route_reports_catch_all() {
    let route = RouteDescriptorBuilder::default()
        .with_path("/:path_match*")
        .with_name("NotFound")
        .build()
        .expect("valid route");

    assert!(route.is_catch_all());
    assert_eq!(route.meta, RouteMeta::PUBLIC);
}
