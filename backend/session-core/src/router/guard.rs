use models::RouteMeta;

/// What the guard wants done with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Proceed,
    /// Send the visitor to the login view, remembering where they wanted to go.
    RedirectToLogin { redirect: String },
    RedirectHome,
}

/// Decide whether a navigation to a route with `meta` may go ahead.
///
/// Rules, first match wins:
/// 1. protected route, no session: login, with `full_path` as the return target
/// 2. guest-only route, session held: home
/// 3. anything else proceeds
pub fn decide(meta: &RouteMeta, is_authenticated: bool, full_path: &str) -> NavigationDecision {
    if meta.requires_auth && !is_authenticated {
        return NavigationDecision::RedirectToLogin {
            redirect: full_path.to_string(),
        };
    }

    if meta.guest && is_authenticated {
        return NavigationDecision::RedirectHome;
    }

    NavigationDecision::Proceed
}
