//! Static route descriptors consulted by the navigation guard.

pub mod builder;

use serde::{Deserialize, Serialize};

/// Access rules attached to a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMeta {
    /// Only reachable with an authenticated session.
    #[serde(default)]
    pub requires_auth: bool,
    /// Only meaningful to unauthenticated visitors (login, register).
    #[serde(default)]
    pub guest: bool,
}

impl RouteMeta {
    pub const PUBLIC: RouteMeta = RouteMeta {
        requires_auth: false,
        guest: false,
    };

    pub const PROTECTED: RouteMeta = RouteMeta {
        requires_auth: true,
        guest: false,
    };

    pub const GUEST: RouteMeta = RouteMeta {
        requires_auth: false,
        guest: true,
    };
}

/// One entry of the application's route table.
///
/// `path` is a pattern: static segments, `:param` segments, and an optional
/// trailing catch-all (`*` or `:name*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: String,
    pub name: String,
    pub component: String,
    pub meta: RouteMeta,
}

impl RouteDescriptor {
    /// True when the last segment swallows the rest of the path.
    pub fn is_catch_all(&self) -> bool {
        self.path
            .rsplit('/')
            .next()
            .is_some_and(is_catch_all_segment)
    }
}

pub(crate) fn is_catch_all_segment(segment: &str) -> bool {
    segment == "*" || (segment.starts_with(':') && segment.ends_with('*'))
}
