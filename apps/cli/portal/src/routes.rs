//! The portal's route table.

use crate::error::PortalError;

use models::{RouteDescriptor, RouteDescriptorBuilder, RouteMeta};
use session_core::error::CoreError;
use session_core::router::RouteTable;

/// `(path, name, meta)` for every page of the site, in match order.
const ROUTES: &[(&str, &str, RouteMeta)] = &[
    ("/", "Home", RouteMeta::PUBLIC),
    ("/oferta", "Oferta", RouteMeta::PUBLIC),
    ("/quienes-somos", "QuienesSomos", RouteMeta::PUBLIC),
    ("/repositorio", "Repositorio", RouteMeta::PROTECTED),
    ("/recursos", "Recursos", RouteMeta::PUBLIC),
    ("/proyectos", "Proyectos", RouteMeta::PUBLIC),
    ("/noticias", "Noticias", RouteMeta::PUBLIC),
    ("/noticias/:year/:month/:day/:slug", "NewsDetail", RouteMeta::PUBLIC),
    ("/chat", "Chat", RouteMeta::PROTECTED),
    ("/partners", "Partners", RouteMeta::PUBLIC),
    ("/contacto", "Contacto", RouteMeta::PUBLIC),
    ("/perfil", "Profile", RouteMeta::PROTECTED),
    ("/terminos", "Terminos", RouteMeta::PUBLIC),
    ("/privacidad", "Privacidad", RouteMeta::PUBLIC),
    ("/auth/login", "Login", RouteMeta::GUEST),
    ("/auth/register", "Register", RouteMeta::GUEST),
    ("/:path_match*", "NotFound", RouteMeta::PUBLIC),
];

/// Build the validated route table.
///
/// # Errors
///
/// Fails only if [`ROUTES`] itself is malformed.
pub fn portal_routes() -> Result<RouteTable, PortalError> {
    let routes = ROUTES
        .iter()
        .map(|(path, name, meta)| {
            RouteDescriptorBuilder::default()
                .with_path(*path)
                .with_name(*name)
                .with_meta(*meta)
                .build()
        })
        .collect::<Result<Vec<RouteDescriptor>, _>>()
        .map_err(CoreError::from)?;

    let table = RouteTable::new(routes).map_err(CoreError::from)?;
    Ok(table)
}
