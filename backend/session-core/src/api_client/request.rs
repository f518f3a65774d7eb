use crate::error::ApiError;

use common::HttpStatusCode;

use std::fmt;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A file attached to a multipart request.
#[derive(Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Field name and file. Kept as raw parts so the form can be rebuilt for a retry.
    Multipart(Vec<(String, UploadFile)>),
}

impl RequestBody {
    pub(crate) fn to_form(parts: &[(String, UploadFile)]) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (field, file) in parts {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(mime) = &file.mime {
                part = part.mime_str(mime)?;
            }
            form = form.part(field.clone(), part);
        }
        Ok(form)
    }
}

/// One logical request against the API.
///
/// Carries its own `retried` marker: the refresh interceptor sets it before
/// resending, and never resends a request that already has it set.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    body: RequestBody,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: RequestBody::Empty,
            retried: false,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PATCH, endpoint)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// Returns [`ApiError::Json`] if `body` does not serialize.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a file as a multipart field. May be called more than once.
    pub fn with_file(mut self, field: impl Into<String>, file: UploadFile) -> Self {
        let field = field.into();
        match &mut self.body {
            RequestBody::Multipart(parts) => parts.push((field, file)),
            _ => self.body = RequestBody::Multipart(vec![(field, file)]),
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// A successful (2xx) response with its body already read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: HttpStatusCode,
    body: String,
}

impl ApiResponse {
    pub(crate) fn new(status: HttpStatusCode, body: String) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> HttpStatusCode {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    /// Returns [`ApiError::Json`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Like [`ApiResponse::json`], but an empty body (204, 205) decodes to `T::default()`.
    pub fn json_or_default<T: DeserializeOwned + Default>(&self) -> Result<T, ApiError> {
        if self.body.trim().is_empty() {
            return Ok(T::default());
        }
        self.json()
    }
}
