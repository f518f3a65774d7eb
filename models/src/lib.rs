//! Domain models for the portal session core.
//!
//! Pure data: user profiles, auth request/response payloads and route
//! descriptors. Nothing here talks to the network or holds session state.
//!
//! ## Architecture
//!
//! - **models** (this crate): Pure data structures
//! - **session-core**: Token lifecycle, API clients, navigation guard
//! - **portal**: Command-line wiring

pub mod auth;
pub mod error;
pub mod route;
pub mod user;

pub use auth::{
    AvatarResponse, Credentials, LoginResponse, NewUser, PasswordChange,
    RefreshResponse, RegisterResponse, TokenPair,
};
pub use error::model_error::ModelError;
pub use route::builder::RouteDescriptorBuilder;
pub use route::{RouteDescriptor, RouteMeta};
pub use user::User;

#[cfg(test)]
mod tests;
