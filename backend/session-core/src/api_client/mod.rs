//! The HTTP client used for every non-auth call.
//!
//! Two cross-cutting behaviors wrap each request:
//!
//! - **Outbound:** the current access token, if any, is attached as
//!   `Authorization: Bearer <token>`. Without a token the request goes out
//!   unmodified.
//! - **Inbound:** a 401 on a request that has not been retried yet (and is
//!   not the logout call) marks the request as retried, asks the session to
//!   refresh, and resends once with the new token. If the refresh fails the
//!   session is cleared, the app is sent to the login view, and the caller
//!   gets the original 401.

pub mod request;

pub use request::{ApiRequest, ApiResponse, RequestBody, UploadFile};

use crate::LOGOUT_ENDPOINT;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{build_client, endpoint_url, read_response};
use crate::session::{RefreshOutcome, SessionState};

use common::{HttpStatusCode, RedactedToken};

use std::sync::Arc;

use log::{debug, info, warn};
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use url::Url;

/// Where the app goes after an unrecoverable refresh failure.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    client: Client,
    session: Arc<SessionState>,
    redirect: Arc<dyn LoginRedirect>,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        session: Arc<SessionState>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ApiError> {
        let (base_url, client) = build_client(config)?;

        Ok(Self {
            base_url,
            client,
            session,
            redirect,
        })
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(endpoint)).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::post(endpoint).with_json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::put(endpoint).with_json(body)?).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::patch(endpoint).with_json(body)?).await
    }

    /// Send `request`, refreshing the session and retrying once on 401.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Status`] for any non-2xx outcome, including the original
    ///   401 when the session could not be refreshed
    /// - [`ApiError::Http`] on transport failure or timeout
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let (response, sent_token) = self.send(&request).await?;
        let status = HttpStatusCode(response.status().as_u16());

        if !status.is_unauthorized() || request.is_retried() || is_logout(request.endpoint()) {
            return read_response(response).await;
        }

        request.mark_retried();
        let unauthorized = ApiError::from_status(status, response.text().await?);

        debug!(
            "{} {} returned 401, attempting token refresh",
            request.method(),
            request.endpoint()
        );

        let outcome = self
            .session
            .refresh_after_unauthorized(sent_token.as_ref())
            .await;

        if outcome.is_success() {
            info!(
                "Retrying {} {} with refreshed token",
                request.method(),
                request.endpoint()
            );
            let (retry, _) = self.send(&request).await?;
            return read_response(retry).await;
        }

        if outcome == RefreshOutcome::Superseded {
            debug!("Session changed during refresh, leaving it as it is");
            return Err(unauthorized);
        }

        warn!(
            "Session could not be refreshed ({outcome:?}), redirecting to login"
        );
        self.session.clear_session();
        self.redirect.redirect_to_login();
        Err(unauthorized)
    }

    /// Build and send one attempt. Returns the token that was attached so the
    /// refresh step can tell whether someone else already replaced it.
    async fn send(
        &self,
        request: &ApiRequest,
    ) -> Result<(reqwest::Response, Option<RedactedToken>), ApiError> {
        let url = endpoint_url(&self.base_url, request.endpoint())?;
        let mut builder = self.client.request(request.method().clone(), url);

        let token = self.session.access_token();
        if let Some(token) = &token {
            builder = builder.header(AUTHORIZATION, token.bearer());
        }

        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(parts) => builder.multipart(RequestBody::to_form(parts)?),
        };

        let response = builder.send().await?;
        Ok((response, token))
    }
}

const LOGOUT_PATH_SUFFIX: &str = const_format::concatcp!("/", LOGOUT_ENDPOINT);

/// Logout is never refreshed and retried, whatever prefix or query the
/// endpoint carries.
pub(crate) fn is_logout(endpoint: &str) -> bool {
    let path = endpoint
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('/');

    path == LOGOUT_ENDPOINT || path.ends_with(LOGOUT_PATH_SUFFIX)
}
