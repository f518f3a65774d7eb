pub mod api_client;
pub mod auth_api;
pub mod config;
pub mod error;
pub mod router;
pub mod session;
pub mod storage;

mod http;
#[cfg(test)]
mod tests;

pub const DEFAULT_API_HOST: &str = "http://127.0.0.1:8000";
pub const API_BASE_PATH: &str = "/api/v1/";
pub const DEFAULT_API_BASE_URL: &str = const_format::concatcp!(DEFAULT_API_HOST, API_BASE_PATH);

const AUTH_PREFIX: &str = "auth/";
pub const LOGIN_ENDPOINT: &str = const_format::concatcp!(AUTH_PREFIX, "login/");
pub const REGISTER_ENDPOINT: &str = const_format::concatcp!(AUTH_PREFIX, "register/");
pub const LOGOUT_ENDPOINT: &str = const_format::concatcp!(AUTH_PREFIX, "logout/");
pub const REFRESH_ENDPOINT: &str = const_format::concatcp!(AUTH_PREFIX, "refresh/");
pub const ME_ENDPOINT: &str = const_format::concatcp!(AUTH_PREFIX, "me/");
pub const PROFILE_ENDPOINT: &str = const_format::concatcp!(AUTH_PREFIX, "profile/");
pub const CHANGE_PASSWORD_ENDPOINT: &str = const_format::concatcp!(AUTH_PREFIX, "change-password/");
pub const AVATAR_ENDPOINT: &str = const_format::concatcp!(AUTH_PREFIX, "avatar/");

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
