//! Shared primitives for the portal workspace.
//!
//! Everything in here is used by more than one crate:
//!
//! - [`ErrorLocation`]: `file:line:column` captured at error construction
//! - [`HttpStatusCode`]: status classification used by the API clients
//! - [`RedactedToken`]: bearer/refresh token wrapper that never leaks its value

pub mod error;
pub mod http_status;
pub mod redacted_token;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_token::RedactedToken;

#[cfg(test)]
mod tests;
