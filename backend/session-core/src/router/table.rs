use crate::error::RouterError;

use common::ErrorLocation;
use models::RouteDescriptor;

use std::collections::{BTreeMap, HashSet};
use std::panic::Location;

/// A route that matched a path, with the values of its `:param` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDescriptor,
    pub params: BTreeMap<String, String>,
}

/// The application's routes, in declaration order.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    /// # Errors
    /// [`RouterError::DuplicateRoute`] if two routes share a name.
    #[track_caller]
    pub fn new(routes: Vec<RouteDescriptor>) -> Result<Self, RouterError> {
        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert(route.name.as_str()) {
                return Err(RouterError::DuplicateRoute {
                    name: route.name.clone(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        Ok(Self { routes })
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn by_name(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// Find the route for `path` (no query string).
    ///
    /// Regular routes are tried in order first; catch-all routes only get
    /// what nothing else matched.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let (catch_alls, regular): (Vec<_>, Vec<_>) =
            self.routes.iter().partition(|route| route.is_catch_all());

        regular
            .into_iter()
            .chain(catch_alls)
            .find_map(|route| {
                match_pattern(&route.path, path).map(|params| RouteMatch { route, params })
            })
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let pattern = segments(pattern);
    let path = segments(path);
    let mut params = BTreeMap::new();

    for (i, segment) in pattern.iter().enumerate() {
        if *segment == "*" {
            return Some(params);
        }

        if let Some(name) = segment.strip_prefix(':') {
            if let Some(name) = name.strip_suffix('*') {
                params.insert(name.to_string(), path.get(i..).unwrap_or_default().join("/"));
                return Some(params);
            }

            params.insert(name.to_string(), path.get(i)?.to_string());
            continue;
        }

        if path.get(i) != Some(segment) {
            return None;
        }
    }

    (pattern.len() == path.len()).then_some(params)
}
