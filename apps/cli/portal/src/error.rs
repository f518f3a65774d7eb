use common::ErrorLocation;
use session_core::error::CoreError;

use thiserror::Error;

/// Errors that end a `portal` invocation.
///
/// Action failures (bad password, expired session) are not errors here: they
/// are reported to the user and turned into a non-zero exit code.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Error from this app
    #[error("Portal Error: {message} {location}")]
    Portal {
        message: String,
        location: ErrorLocation,
    },

    /// Command-line input that parsed but makes no sense
    #[error("Input Error: {message} {location}")]
    Input {
        message: String,
        location: ErrorLocation,
    },

    /// Error from session-core (config, storage, routing)
    #[error(transparent)]
    Core(#[from] CoreError),
}
