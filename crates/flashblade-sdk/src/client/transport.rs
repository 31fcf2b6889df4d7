//! The transport seam between the dispatcher and the network.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;

use crate::error::{Error, Result};
use crate::params::Params;

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A JSON document.
    Json(serde_json::Value),
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
}

/// A fully resolved request, ready to hand to a [`Transport`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the target, e.g. `/api/2.15/file-systems`.
    pub path: String,
    /// Query parameters.
    pub query: Params,
    /// Optional request body.
    pub body: Option<RequestBody>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Total timeout for the exchange.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// Creates a request without parameters, body or headers.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Params::new(),
            body: None,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Params) -> Self {
        self.query = query;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the total timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a header.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name or value is not a valid header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        self.set_header(name, value)?;
        Ok(self)
    }

    /// Sets a header in place.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name or value is not a valid header.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::config(format!("Invalid header name {name}: {e}")))?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|e| Error::config(format!("Invalid value for header {name}: {e}")))?;
        let sensitive = name == reqwest::header::AUTHORIZATION
            || name.as_str() == "x-auth-token"
            || name.as_str() == "api-token";
        value.set_sensitive(sensitive);
        self.headers.insert(name, value);
        Ok(())
    }

    /// Returns a header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A successful (2xx) reply.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Bytes,
}

impl RawResponse {
    /// Creates a reply with no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns a header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A non-2xx reply.
#[derive(Debug, Clone)]
pub struct HttpFailure {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body, typically a JSON error document.
    pub body: Bytes,
}

impl HttpFailure {
    /// Creates a failure with no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns the body as text.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.body_text())
    }
}

/// Failure modes of a transport call.
#[derive(Debug)]
pub enum TransportError {
    /// The server replied with a non-2xx status.
    Status(HttpFailure),
    /// The exchange failed without an HTTP status.
    Other(Error),
}

impl From<HttpFailure> for TransportError {
    fn from(failure: HttpFailure) -> Self {
        Self::Status(failure)
    }
}

impl From<Error> for TransportError {
    fn from(error: Error) -> Self {
        Self::Other(error)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::Other(Error::Network(error))
    }
}

/// Executes requests against a FlashBlade target.
///
/// [`HttpTransport`](super::HttpTransport) is the network implementation;
/// [`MockTransport`](crate::testkit::MockTransport) answers from memory.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes one request. Non-2xx replies must map to [`TransportError::Status`].
    async fn execute(&self, request: ApiRequest) -> std::result::Result<RawResponse, TransportError>;
}
