//! HTTP request model and transport.
//!
//! DESIGN
//! ======
//! Requests are plain values (`ApiRequest`) so endpoint construction can be
//! asserted without a network. The `Transport` trait is the only seam that
//! touches the wire; `HttpTransport` implements it with `reqwest`, and tests
//! substitute a recording mock.
//!
//! A transport never interprets status codes. Status handling lives in
//! `ApiClient` so every transport shares the same error semantics.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::path::Path;

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderName};
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;

// =============================================================================
// REQUEST
// =============================================================================

/// Body attached to an [`ApiRequest`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(UploadForm),
}

/// A multipart upload: text fields plus one file part named `file`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub fields: Vec<(String, String)>,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadForm {
    /// Value of a text field, if present.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn into_multipart(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        let mut part = reqwest::multipart::Part::bytes(self.bytes).file_name(self.file_name);
        if let Some(mime) = self.mime_type.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|e| ApiError::Encode(e.to_string()))?;
        }
        Ok(form.part("file", part))
    }
}

/// One API call: method, path relative to the base URL, query pairs, body.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: RequestBody::Empty }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query pair.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Append a query pair only when `value` is present and non-blank.
    #[must_use]
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value.map(|v| v.to_string()) {
            Some(v) if !v.trim().is_empty() => self.query(key, v.trim()),
            _ => self,
        }
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    #[must_use]
    pub fn multipart(mut self, form: UploadForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Value of the first query pair named `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// JSON body, if this request carries one.
    #[must_use]
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Join `base` and this request's path, then append encoded query pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if the joined string is not a URL.
    pub fn url(&self, base: &str) -> Result<Url, ApiError> {
        let joined = format!("{}{}", base.trim_end_matches('/'), self.path);
        let mut url = Url::parse(&joined).map_err(|e| ApiError::InvalidBaseUrl(format!("{base}: {e}")))?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Raw response as seen by the client: status, a few headers, body bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// JSON response with the given status.
    #[must_use]
    pub fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_owned()),
            content_disposition: None,
            body: value.to_string().into_bytes(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Sends one request and returns the raw response. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] only when no response was obtained; non-2xx
    /// statuses are returned as ordinary responses.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// `reqwest`-backed transport against a fixed base URL.
///
/// No timeout and no retries: one request per call, awaited to completion.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] for an unparsable base URL, or
    /// [`ApiError::Transport`] if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = request.url(&self.base_url)?;
        let ApiRequest { method, body, .. } = request;

        let builder = self.http.request(method, url);
        let builder = match body {
            RequestBody::Empty => builder.header(CONTENT_TYPE, "application/json"),
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form.into_multipart()?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let content_type = header_string(response.headers(), &CONTENT_TYPE);
        let content_disposition = header_string(response.headers(), &CONTENT_DISPOSITION);
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .to_vec();

        Ok(ApiResponse { status, content_type, content_disposition, body })
    }
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

/// File name from a `Content-Disposition` header.
///
/// Prefers the RFC 5987 `filename*=UTF-8''...` form (percent-decoded) over a
/// plain `filename="..."`. Only the final path component is returned, so the
/// name is always safe to join onto a local directory.
#[must_use]
pub fn disposition_file_name(header: &str) -> Option<String> {
    let mut plain = None;
    for param in header.split(';').map(str::trim) {
        if let Some(encoded) = param.strip_prefix("filename*=") {
            let encoded = encoded
                .split_once("''")
                .map_or(encoded, |(_, rest)| rest);
            let decoded = urlencoding::decode_binary(encoded.as_bytes());
            return base_name(&String::from_utf8_lossy(&decoded));
        }
        if let Some(name) = param.strip_prefix("filename=") {
            plain = base_name(name.trim_matches('"'));
        }
    }
    plain
}

/// Last normal path component of `name`, treating `\` as a separator too.
fn base_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    Path::new(last)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(ToOwned::to_owned)
}
