//! HTTP transport seam.
//!
//! [`GatewayClient`](crate::GatewayClient) builds [`HttpRequest`] values and
//! hands them to a [`Transport`]. Production code uses [`ReqwestTransport`];
//! tests substitute an in-memory implementation.

use std::time::Duration;

use async_trait::async_trait;
use llmgate_core::TargetName;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use tracing::debug;
use url::Url;

use crate::error::{LlmError, Result};

/// Header naming the end user on whose behalf a tool runs.
pub const USER_ID_HEADER: &str = "X-User-ID";

const JSON_MIME: &str = "application/json";

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// Pre-serialized JSON.
    Json(Vec<u8>),
    /// `multipart/form-data` with text fields and files.
    Multipart {
        /// Text fields.
        fields: Vec<(String, String)>,
        /// File fields.
        files: Vec<FilePart>,
    },
}

/// A request relative to the gateway base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Path, starting with `/`.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Endpoint group; named in the user agent.
    pub target: TargetName,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Payload.
    pub body: RequestBody,
}

impl HttpRequest {
    /// A `GET` for `path`.
    #[must_use]
    pub fn get(target: TargetName, path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            target,
            timeout,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// A `POST` for `path` with the given body.
    #[must_use]
    pub fn post(
        target: TargetName,
        path: impl Into<String>,
        timeout: Duration,
        body: RequestBody,
    ) -> Self {
        Self {
            method: Method::Post,
            body,
            ..Self::get(target, path, timeout)
        }
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header called `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status.
    pub status: u16,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as (lossy) UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests to the gateway.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Non-2xx statuses are returned, not raised.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] over `reqwest` with bearer-token auth.
pub struct ReqwestTransport {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ReqwestTransport {
    /// Create a transport for `base_url`.
    ///
    /// # Errors
    /// Returns `LlmError::Config` if the URL does not parse or has no host.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| LlmError::Config(format!("url: {e}")))?;
        if parsed.host_str().is_none() {
            return Err(LlmError::Config(format!("url {base_url:?} has no host")));
        }
        Ok(Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn build(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, request.path);
        let builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };

        let mut builder = builder
            .timeout(request.timeout)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(USER_AGENT, request.target.as_str())
            .header(ACCEPT, JSON_MIME);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.header(CONTENT_TYPE, JSON_MIME).body(bytes),
            RequestBody::Multipart { fields, files } => {
                let mut form = Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                for file in files {
                    form = form.part(file.field, Part::bytes(file.bytes).file_name(file.file_name));
                }
                builder.multipart(form)
            }
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let timeout = request.timeout;
        let path = request.path.clone();
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                LlmError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
            } else {
                LlmError::from(e)
            }
        };

        let response = self.build(request).send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?.to_vec();
        debug!(path = %path, status, bytes = body.len(), "Gateway responded");

        Ok(HttpResponse { status, body })
    }
}
