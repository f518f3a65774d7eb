use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RouterError {
    #[error("No Route Error: nothing matches '{path}' and no not-found route is defined {location}")]
    NotFound {
        path: String,
        location: ErrorLocation,
    },

    #[error("Unknown Route Error: no route named '{name}' {location}")]
    UnknownRoute {
        name: String,
        location: ErrorLocation,
    },

    #[error("Duplicate Route Error: route name '{name}' is used twice {location}")]
    DuplicateRoute {
        name: String,
        location: ErrorLocation,
    },

    #[error("Redirect Loop Error: redirect from '{path}' was redirected again {location}")]
    RedirectLoop {
        path: String,
        location: ErrorLocation,
    },
}
