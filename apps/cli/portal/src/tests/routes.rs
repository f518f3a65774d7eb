use crate::routes::portal_routes;

use models::RouteMeta;

/// **VALUE**: Verifies the built-in table is valid and has the routes the router
/// navigates to on its own.
///
/// **BUG THIS CATCHES**: A typo in a route name (e.g. "login") would make every
/// protected page fail with an unknown-route error at runtime.
#[test]
fn given_portal_routes_when_built_then_login_home_and_not_found_exist() {
    // WHEN: Building the table
    let table = portal_routes().expect("valid table");

    // THEN: The router's well-known routes are present
    assert_eq!(table.by_name("Login").map(|r| r.meta), Some(RouteMeta::GUEST));
    assert_eq!(table.by_name("Home").map(|r| r.path.as_str()), Some("/"));
    assert!(table.by_name("NotFound").is_some_and(|r| r.is_catch_all()));
}

#[test]
fn given_portal_routes_when_listing_protected_then_matches_site_sections() {
    let table = portal_routes().expect("valid table");

    let mut protected: Vec<_> = table
        .routes()
        .iter()
        .filter(|r| r.meta.requires_auth)
        .map(|r| r.name.as_str())
        .collect();
    protected.sort_unstable();

    assert_eq!(protected, ["Chat", "Profile", "Repositorio"]);
}

#[test]
fn given_news_article_path_when_resolving_then_matches_news_detail() {
    let table = portal_routes().expect("valid table");

    let found = table.resolve("/noticias/2025/01/09/convocatoria").expect("route");

    assert_eq!(found.route.name, "NewsDetail");
    assert_eq!(found.params["slug"], "convocatoria");
}
