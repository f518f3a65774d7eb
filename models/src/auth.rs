//! Request and response payloads for the `auth/` endpoints.
//!
//! Anything carrying a password or token has a hand-written `Debug` so the
//! secret never reaches a log line.

use crate::User;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of `POST auth/login/`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST auth/register/`.
#[derive(Clone, Default, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("user_type", &self.user_type)
            .finish_non_exhaustive()
    }
}

/// Body of `PUT auth/change-password/`.
#[derive(Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordChange([REDACTED])")
    }
}

/// Access/refresh pair issued on login.
#[derive(Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenPair([REDACTED])")
    }
}

/// Success payload of `POST auth/login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

/// Success payload of `POST auth/refresh/`.
#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

impl fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefreshResponse([REDACTED])")
    }
}

/// Success payload of `POST auth/register/`.
///
/// Registration is verification-gated: the server returns the created user
/// and a message, never tokens.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Success payload of `PATCH auth/avatar/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvatarResponse {
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
