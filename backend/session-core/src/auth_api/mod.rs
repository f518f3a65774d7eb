//! Bare client for the token endpoints.
//!
//! Login, register, refresh and logout go through this client instead of
//! [`ApiClient`](crate::api_client::ApiClient): it never attaches the stored
//! token on its own and never runs the refresh interceptor, so a failing
//! refresh cannot trigger another refresh.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{build_client, endpoint_url, read_response};
use crate::api_client::ApiResponse;
use crate::{LOGIN_ENDPOINT, LOGOUT_ENDPOINT, REFRESH_ENDPOINT, REGISTER_ENDPOINT};

use common::RedactedToken;
use models::{Credentials, LoginResponse, NewUser, RefreshResponse, RegisterResponse};

use log::debug;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde_json::json;
use url::Url;

#[derive(Debug, Clone)]
pub struct AuthApiClient {
    base_url: Url,
    client: Client,
}

impl AuthApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let (base_url, client) = build_client(config)?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST auth/login/`.
    ///
    /// # Errors
    /// [`ApiError::Status`] with 403 when the account is not verified yet,
    /// 401/400 for bad credentials, [`ApiError::Http`] on transport failure.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        debug!("POST {LOGIN_ENDPOINT} for '{}'", credentials.username);
        self.post(LOGIN_ENDPOINT, credentials, None).await?.json()
    }

    /// `POST auth/register/`. Registration never issues tokens.
    pub async fn register(&self, new_user: &NewUser) -> Result<RegisterResponse, ApiError> {
        debug!("POST {REGISTER_ENDPOINT} for '{}'", new_user.username);
        self.post(REGISTER_ENDPOINT, new_user, None)
            .await?
            .json_or_default()
    }

    /// `POST auth/refresh/`: exchange the refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &RedactedToken) -> Result<RefreshResponse, ApiError> {
        debug!("POST {REFRESH_ENDPOINT}");
        let body = json!({ "refresh": refresh_token.as_str() });
        self.post(REFRESH_ENDPOINT, &body, None).await?.json()
    }

    /// `POST auth/logout/`: blacklist the refresh token server-side.
    ///
    /// The access token is sent explicitly because this client does not
    /// attach one on its own.
    pub async fn logout(
        &self,
        access_token: Option<&RedactedToken>,
        refresh_token: &RedactedToken,
    ) -> Result<(), ApiError> {
        debug!("POST {LOGOUT_ENDPOINT}");
        let body = json!({ "refresh_token": refresh_token.as_str() });
        self.post(LOGOUT_ENDPOINT, &body, access_token).await?;
        Ok(())
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        bearer: Option<&RedactedToken>,
    ) -> Result<ApiResponse, ApiError> {
        let url = endpoint_url(&self.base_url, endpoint)?;

        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, token.bearer());
        }

        read_response(request.send().await?).await
    }
}
