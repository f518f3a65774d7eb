//! Plumbing shared by the auth client and the main API client.

use crate::api_client::ApiResponse;
use crate::config::ApiConfig;
use crate::error::ApiError;

use common::HttpStatusCode;

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use url::Url;

const JSON_MIME: &str = "application/json";

/// Parse the configured base URL and build a client with the configured timeout.
pub(crate) fn build_client(config: &ApiConfig) -> Result<(Url, Client), ApiError> {
    let base_url = parse_base_url(&config.base_url)?;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MIME));

    let client = Client::builder()
        .timeout(config.timeout())
        .default_headers(headers)
        .build()?;

    Ok((base_url, client))
}

/// Endpoints are joined relative to the base, so the base must end in `/`
/// or its last segment (`v1`) would be replaced.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let mut base_url = Url::parse(raw)?;
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    Ok(base_url)
}

pub(crate) fn endpoint_url(base_url: &Url, endpoint: &str) -> Result<Url, ApiError> {
    Ok(base_url.join(endpoint.trim_start_matches('/'))?)
}

/// Read the body and turn any non-2xx status into [`ApiError::Status`].
pub(crate) async fn read_response(response: reqwest::Response) -> Result<ApiResponse, ApiError> {
    let status = HttpStatusCode(response.status().as_u16());
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::from_status(status, body));
    }

    Ok(ApiResponse::new(status, body))
}
