//! Path resolution and guarded navigation.
//!
//! [`Router::navigate`] resolves a path against the [`RouteTable`], asks the
//! [`guard`] whether the current session may enter it, follows at most one
//! redirect, and records where the app ended up.

pub mod guard;
pub mod table;

pub use guard::{NavigationDecision, decide};
pub use table::{RouteMatch, RouteTable};

use crate::api_client::LoginRedirect;
use crate::error::RouterError;
use crate::session::SessionState;

use common::ErrorLocation;
use models::RouteDescriptor;

use std::collections::BTreeMap;
use std::panic::Location as CallerLocation;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, info, warn};
use url::form_urlencoded;

pub const DEFAULT_LOGIN_ROUTE: &str = "Login";
pub const DEFAULT_HOME_ROUTE: &str = "Home";
pub const DEFAULT_NOT_FOUND_ROUTE: &str = "NotFound";

/// Query key carrying the path a login redirect should return to.
pub const REDIRECT_QUERY_KEY: &str = "redirect";

/// Names of the routes the router itself navigates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNames {
    pub login: String,
    pub home: String,
    pub not_found: String,
}

impl Default for RouteNames {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_ROUTE.to_string(),
            home: DEFAULT_HOME_ROUTE.to_string(),
            not_found: DEFAULT_NOT_FOUND_ROUTE.to_string(),
        }
    }
}

/// Where a navigation landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub path: String,
    /// `path` plus the query string, as it would appear in an address bar.
    pub full_path: String,
    pub query: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
}

impl Location {
    /// The return target of a login redirect, if any.
    pub fn redirect_target(&self) -> Option<&str> {
        self.query.get(REDIRECT_QUERY_KEY).map(String::as_str)
    }
}

pub struct Router {
    table: RouteTable,
    names: RouteNames,
    session: Arc<SessionState>,
    current: RwLock<Option<Location>>,
}

impl Router {
    /// Router with the default route names.
    ///
    /// # Errors
    /// [`RouterError::UnknownRoute`] if the table has no login or home route.
    #[track_caller]
    pub fn new(table: RouteTable, session: Arc<SessionState>) -> Result<Self, RouterError> {
        Self::with_names(table, RouteNames::default(), session)
    }

    #[track_caller]
    pub fn with_names(
        table: RouteTable,
        names: RouteNames,
        session: Arc<SessionState>,
    ) -> Result<Self, RouterError> {
        for name in [&names.login, &names.home] {
            if table.by_name(name).is_none() {
                return Err(RouterError::UnknownRoute {
                    name: name.clone(),
                    location: ErrorLocation::from(CallerLocation::caller()),
                });
            }
        }

        Ok(Self {
            table,
            names,
            session,
            current: RwLock::new(None),
        })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn current(&self) -> Option<Location> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Navigate to `target` (a path with an optional `?query`).
    ///
    /// # Errors
    /// - [`RouterError::NotFound`] if nothing matches and there is no not-found route
    /// - [`RouterError::RedirectLoop`] if the redirect target is itself redirected
    #[track_caller]
    pub fn navigate(&self, target: &str) -> Result<Location, RouterError> {
        let caller = CallerLocation::caller();
        let (path, query) = split_target(target);

        let (route, params) = match self.table.resolve(path) {
            Some(found) => (found.route, found.params),
            None => {
                let route = self.table.by_name(&self.names.not_found).ok_or_else(|| {
                    RouterError::NotFound {
                        path: path.to_string(),
                        location: ErrorLocation::from(caller),
                    }
                })?;
                debug!("No route matches '{path}', showing {}", route.name);
                let location = location_for(route, path, query, BTreeMap::new());
                return Ok(self.commit(location));
            }
        };

        let location = location_for(route, path, query, params);
        let decision = decide(
            &route.meta,
            self.session.is_authenticated(),
            &location.full_path,
        );

        let location = match decision {
            NavigationDecision::Proceed => location,
            NavigationDecision::RedirectToLogin { redirect } => {
                info!("'{}' requires a session, redirecting to login", location.full_path);
                let mut query = BTreeMap::new();
                query.insert(REDIRECT_QUERY_KEY.to_string(), redirect);
                self.redirect_to(&self.names.login, query, caller)?
            }
            NavigationDecision::RedirectHome => {
                debug!("'{}' is guest-only, redirecting home", location.full_path);
                self.redirect_to(&self.names.home, BTreeMap::new(), caller)?
            }
        };

        Ok(self.commit(location))
    }

    /// Go to the named route. The guard must let it through without a
    /// further redirect.
    fn redirect_to(
        &self,
        name: &str,
        query: BTreeMap<String, String>,
        caller: &'static CallerLocation<'static>,
    ) -> Result<Location, RouterError> {
        let route = self
            .table
            .by_name(name)
            .ok_or_else(|| RouterError::UnknownRoute {
                name: name.to_string(),
                location: ErrorLocation::from(caller),
            })?;

        let location = location_for(route, &route.path, query, BTreeMap::new());

        match decide(
            &route.meta,
            self.session.is_authenticated(),
            &location.full_path,
        ) {
            NavigationDecision::Proceed => Ok(location),
            _ => Err(RouterError::RedirectLoop {
                path: location.full_path,
                location: ErrorLocation::from(caller),
            }),
        }
    }

    fn commit(&self, location: Location) -> Location {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(location.clone());
        location
    }
}

impl LoginRedirect for Router {
    fn redirect_to_login(&self) {
        let caller = CallerLocation::caller();
        match self.redirect_to(&self.names.login, BTreeMap::new(), caller) {
            Ok(location) => {
                info!("Session ended, now at {}", location.full_path);
                self.commit(location);
            }
            Err(e) => warn!("Could not navigate to login: {e}"),
        }
    }
}

fn split_target(target: &str) -> (&str, BTreeMap<String, String>) {
    match target.split_once('?') {
        Some((path, query)) => (
            path,
            form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        ),
        None => (target, BTreeMap::new()),
    }
}

fn location_for(
    route: &RouteDescriptor,
    path: &str,
    query: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
) -> Location {
    let full_path = if query.is_empty() {
        path.to_string()
    } else {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&query)
            .finish();
        format!("{path}?{encoded}")
    };

    Location {
        name: route.name.clone(),
        path: path.to_string(),
        full_path,
        query,
        params,
    }
}
