//! HTTP client implementation
//!
//! This module implements the plain request/response layer used to talk to the
//! CarePair REST API: request and response types, client configuration, and a
//! raw client that sends JSON or multipart bodies and maps failures onto
//! [`Error`](crate::Error). Credential handling lives in [`crate::auth`].

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::{Error, Result};

/// Environment variable holding the API base URL
pub const API_URL_ENV: &str = "CAREPAIR_API_URL";

/// Environment variable overriding the request timeout, in seconds
pub const API_TIMEOUT_ENV: &str = "CAREPAIR_API_TIMEOUT_SECS";

// =============================================================================
// Request Types
// =============================================================================

/// Verbs the CarePair API uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PATCH request
    Patch,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// One part of a multipart form
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    /// Plain text field
    Text {
        /// Field name
        name: String,
        /// Field value
        value: String,
    },
    /// File upload
    File {
        /// Field name
        name: String,
        /// File contents
        bytes: Vec<u8>,
        /// File name reported to the server
        file_name: String,
        /// MIME type of the contents
        mime: String,
    },
}

/// Multipart form body
///
/// Unlike `reqwest::multipart::Form` this is cloneable, so a request can be
/// replayed after a token refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text { name: name.into(), value: value.into() });
        self
    }

    /// Append a text field holding the JSON encoding of `value`
    pub fn json_text<T: Serialize>(self, name: impl Into<String>, value: &T) -> Result<Self> {
        let encoded = serde_json::to_string(value).map_err(|e| Error::Encode(e.to_string()))?;
        Ok(self.text(name, encoded))
    }

    /// Append a file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            bytes,
            file_name: file_name.into(),
            mime: mime.into(),
        });
        self
    }

    /// All parts in insertion order
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Value of the first text field with the given name
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Whether any part uses the given field name
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|part| match part {
            FormPart::Text { name: n, .. } | FormPart::File { name: n, .. } => n == name,
        })
    }

    fn to_reqwest(&self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File { name, bytes, file_name, mime } => {
                    let file = reqwest::multipart::Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime)
                        .map_err(|e| Error::Encode(format!("invalid MIME type {mime}: {e}")))?;
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Pre-encoded JSON
    Json(Vec<u8>),
    /// Multipart form data
    Multipart(MultipartForm),
}

/// One call to a REST endpoint
///
/// Cloneable so the authenticated client can replay it once after a
/// token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Verb
    pub method: HttpMethod,
    /// Path relative to the base URL (e.g., "/auth/login/")
    pub path: String,
    /// Body, if any
    pub body: Option<RequestBody>,
    /// Set once the request has been replayed after a token refresh
    pub retried: bool,
}

impl ApiRequest {
    /// Bare request for `method` and `path`
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            retried: false,
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// `POST path`
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// `PATCH path`
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Encode `value` as the JSON body
    pub fn json_body<T: Serialize>(mut self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value).map_err(|e| Error::Encode(e.to_string()))?;
        self.body = Some(RequestBody::Json(body));
        Ok(self)
    }

    /// Set a multipart body
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Successful response: status, headers and the decoded body
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// 2xx status
    pub status: u16,
    /// Header values that were valid UTF-8
    pub headers: HashMap<String, String>,
    /// Decoded body
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wrap a decoded body
    pub fn new(status: u16, headers: HashMap<String, String>, data: T) -> Self {
        Self { status, headers, data }
    }

    /// Look up a header by its lowercase name
    pub fn header(&self, key: &str) -> Option<&String> {
        self.headers.get(key)
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Where the API lives and how requests are sent
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Prefix for every endpoint path, such as `http://localhost:8000/api`
    pub base_url: String,
    /// Request timeout; an expired request fails as a network error
    pub timeout: Duration,
    /// Sent as `User-Agent`
    pub user_agent: String,
    /// Added to every request before per-request headers
    pub default_headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout: Duration::from_secs(15),
            user_agent: format!("CarePair/{}", env!("CARGO_PKG_VERSION")),
            default_headers,
        }
    }
}

impl ApiClientConfig {
    /// Defaults for `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    /// Build a config from `CAREPAIR_API_URL` and `CAREPAIR_API_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(API_URL_ENV)
            .map_err(|_| Error::Config(format!("{API_URL_ENV} is not set")))?;
        if base_url.trim().is_empty() {
            return Err(Error::Config(format!("{API_URL_ENV} is empty")));
        }

        let mut config = Self::new(base_url.trim());
        if let Ok(raw) = std::env::var(API_TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{API_TIMEOUT_ENV} must be whole seconds, got {raw:?}")))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Send `key: value` with every request
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Join the base URL and an endpoint path
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

// =============================================================================
// Raw Client
// =============================================================================

use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};

/// Raw API client
///
/// Sends a request as-is, optionally with a bearer token. It never touches
/// token storage and never retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: ReqwestClient,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Build the underlying reqwest client
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Execute a request, attaching `bearer` as the Authorization header
    pub async fn execute<T>(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.config.url_for(&request.path);

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Patch => self.client.patch(&url),
        };

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        match &request.body {
            Some(RequestBody::Json(bytes)) => {
                req = req
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
            }
            Some(RequestBody::Multipart(form)) => {
                req = req.multipart(form.to_reqwest()?);
            }
            None => {}
        }

        tracing::debug!(method = request.method.as_str(), %url, retried = request.retried, "request");

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!(%url, "request timed out");
                Error::Network(format!("Request timed out after {:?}", self.config.timeout))
            } else {
                tracing::warn!(%url, "request failed before a response was received");
                Error::Network(format!("Request failed: {e}"))
            }
        })?;

        self.parse_response(response, &request.path).await
    }

    async fn parse_response<T>(&self, response: ReqwestResponse, path: &str) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(key.to_string(), value_str.to_string());
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {e}")))?;

        if !(200..300).contains(&status) {
            tracing::debug!(status, path, "response rejected");
            let body = serde_json::from_str::<serde_json::Value>(&body).ok();
            return Err(Error::Api { status, body });
        }

        tracing::debug!(status, path, "response");

        // Endpoints such as logout may answer 204 with nothing at all
        let text = if body.trim().is_empty() { "null" } else { body.as_str() };
        let data: T = serde_json::from_str(text)
            .map_err(|e| Error::Decode(format!("{path}: {e}")))?;

        Ok(ApiResponse::new(status, headers, data))
    }

    /// Settings this client was built with
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Shortcut for `config().base_url`
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}
