//! Error types for calls against the portal REST API.
//!
//! - HTTP status codes stored directly (not parsed from strings)
//! - Server-provided detail extracted once, at construction
//! - All errors include ErrorLocation for debugging

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use serde_json::Value;
use thiserror::Error as ThisError;

/// Body keys the server uses for a human-readable rejection reason, in
/// priority order.
const DETAIL_KEYS: [&str; 2] = ["error", "detail"];

/// Field-level validation errors that apply to the whole form.
const NON_FIELD_ERRORS_KEY: &str = "non_field_errors";

#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("HTTP Error: {message} {location}")]
    Http {
        message: String,
        is_timeout: bool,
        is_connection: bool,
        location: ErrorLocation,
    },

    #[error("Status Error: HTTP {status} - {} {location}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: HttpStatusCode,
        detail: Option<String>,
        body: String,
        location: ErrorLocation,
    },

    #[error("JSON Error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
    },

    #[error("URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Request Build Error: {message} {location}")]
    RequestBuild {
        message: String,
        location: ErrorLocation,
    },
}

impl ApiError {
    /// Create from a non-2xx response.
    #[track_caller]
    pub fn from_status(status: impl Into<HttpStatusCode>, body: impl Into<String>) -> Self {
        let body = body.into();
        ApiError::Status {
            status: status.into(),
            detail: extract_detail(&body),
            body,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Get HTTP status code if the server answered.
    pub fn status_code(&self) -> Option<HttpStatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code().is_some_and(|s| s.is_unauthorized())
    }

    pub fn is_forbidden(&self) -> bool {
        self.status_code().is_some_and(|s| s.is_forbidden())
    }

    /// Transport failure: the request never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Http { .. })
    }

    /// Server-provided reason, suitable for showing to the user.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Get error category for logging.
    pub fn error_category(&self) -> &'static str {
        match self {
            ApiError::Http { is_timeout: true, .. } => "timeout",
            ApiError::Http { is_connection: true, .. } => "connection",
            ApiError::Http { .. } => "network",
            ApiError::Status { status, .. } if status.is_unauthorized() => "unauthorized",
            ApiError::Status { status, .. } if status.is_forbidden() => "forbidden",
            ApiError::Status { status, .. } if status.is_client_error() => "client_error",
            ApiError::Status { status, .. } if status.is_server_error() => "server_error",
            ApiError::Status { .. } => "status",
            ApiError::Json { .. } => "json",
            ApiError::UrlParse { .. } => "url",
            ApiError::RequestBuild { .. } => "request_build",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        // Check for specific error types BEFORE converting to string
        let is_timeout = error.is_timeout();
        let is_connection = error.is_connect();

        if error.is_decode() {
            return ApiError::Json {
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        if error.is_builder() {
            return ApiError::RequestBuild {
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        ApiError::Http {
            message: error.to_string(),
            is_timeout,
            is_connection,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<url::ParseError> for ApiError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        ApiError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        ApiError::Json {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Pull a user-facing reason out of an error body.
///
/// Looks at `error`, then `detail`, then `non_field_errors`, then the first
/// field error of a validation response (`{"email": ["already taken"]}`).
pub fn extract_detail(body: &str) -> Option<String> {
    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) else {
        return None;
    };

    for key in DETAIL_KEYS {
        if let Some(text) = fields.get(key).and_then(first_text) {
            return Some(text);
        }
    }

    if let Some(text) = fields.get(NON_FIELD_ERRORS_KEY).and_then(first_text) {
        return Some(text);
    }

    fields.values().find_map(first_text)
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}
