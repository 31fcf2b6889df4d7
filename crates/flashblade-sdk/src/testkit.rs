//! In-memory transport for tests.
//!
//! [`MockTransport`] records every request and answers API calls from a queue
//! of canned replies. Auth endpoints are answered automatically: each login
//! returns `session-<n>` in `x-auth-token`, each token exchange returns
//! `access-<n>`, and logout succeeds.
//!
//! ```
//! use std::sync::Arc;
//! use flashblade_sdk::testkit::MockTransport;
//! use flashblade_sdk::Client;
//! use serde_json::json;
//!
//! # async fn example() -> flashblade_sdk::Result<()> {
//! let transport = Arc::new(MockTransport::new());
//! transport.push_page(vec![json!({"name": "fs1"})], None, None);
//!
//! let client = Client::builder()
//!     .target("fb.example.com")
//!     .api_token("T-1234")
//!     .transport(transport.clone())
//!     .build()?;
//! let response = client.arrays().list().await?;
//! assert!(response.is_valid());
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{json, Value};

use crate::auth::{LOGIN_PATH, LOGOUT_PATH, TOKEN_PATH};
use crate::client::{
    ApiRequest, HttpFailure, RawResponse, Transport, TransportError, API_VERSION_PATH,
};
use crate::error::Error;
use crate::headers::{
    X_AUTH_TOKEN, X_RATELIMIT_MIN, X_RATELIMIT_REMAINING_MIN, X_REQUEST_ID,
};

/// A canned reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// An HTTP reply; statuses outside 2xx become [`TransportError::Status`].
    Http {
        /// Status code.
        status: u16,
        /// Headers.
        headers: HeaderMap,
        /// Body.
        body: Bytes,
    },
    /// A failure without an HTTP status, such as a refused connection.
    ///
    /// `reqwest` errors cannot be built outside `reqwest`, so this surfaces as
    /// [`Error::Io`] with [`ConnectionRefused`](std::io::ErrorKind::ConnectionRefused)
    /// where [`HttpTransport`](crate::client::HttpTransport) would report
    /// [`Error::Network`]. Both arrive through [`TransportError::Other`].
    Network(String),
}

impl MockReply {
    /// A reply with a JSON body.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::Http {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    /// A reply with a raw body.
    #[must_use]
    pub fn raw(status: u16, body: impl Into<Bytes>) -> Self {
        Self::Http {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let parsed = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        );
        if let (Self::Http { headers, .. }, (Ok(name), Ok(value))) = (&mut self, parsed) {
            headers.insert(name, value);
        }
        self
    }

    fn into_result(self) -> Result<RawResponse, TransportError> {
        match self {
            Self::Http {
                status,
                headers,
                body,
            } if (200..300).contains(&status) => Ok(RawResponse {
                status,
                headers,
                body,
            }),
            Self::Http {
                status,
                headers,
                body,
            } => Err(TransportError::Status(HttpFailure {
                status,
                headers,
                body,
            })),
            Self::Network(message) => Err(TransportError::Other(Error::Io(
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, message),
            ))),
        }
    }
}

/// A [`Transport`] that answers from memory.
#[derive(Debug)]
pub struct MockTransport {
    requests: RwLock<Vec<ApiRequest>>,
    replies: Mutex<VecDeque<MockReply>>,
    logins: AtomicUsize,
    exchanges: AtomicUsize,
    reject_auth: bool,
    unreachable_auth: bool,
    api_versions: Vec<String>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            requests: RwLock::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            logins: AtomicUsize::new(0),
            exchanges: AtomicUsize::new(0),
            reject_auth: false,
            unreachable_auth: false,
            api_versions: vec!["2.0".into(), "2.14".into(), "2.15".into()],
        }
    }
}

impl MockTransport {
    /// Creates a transport with an empty reply queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every login and token exchange fail with 401.
    #[must_use]
    pub fn reject_auth(mut self) -> Self {
        self.reject_auth = true;
        self
    }

    /// Makes login, token exchange and logout fail as [`MockReply::Network`].
    #[must_use]
    pub fn unreachable_auth(mut self) -> Self {
        self.unreachable_auth = true;
        self
    }

    /// Sets the versions reported by `/api/api_version`.
    #[must_use]
    pub fn with_api_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_versions = versions.into_iter().map(Into::into).collect();
        self
    }

    /// Queues a reply for the next API call.
    pub fn push(&self, reply: MockReply) {
        self.replies.lock().push_back(reply);
    }

    /// Queues a JSON reply.
    pub fn push_json(&self, status: u16, body: Value) {
        self.push(MockReply::json(status, &body));
    }

    /// Queues a collection page.
    pub fn push_page(
        &self,
        items: Vec<Value>,
        continuation_token: Option<&str>,
        more_items_remaining: Option<bool>,
    ) {
        let mut body = json!({ "items": items });
        if let Some(token) = continuation_token {
            body["continuation_token"] = json!(token);
        }
        if let Some(more) = more_items_remaining {
            body["more_items_remaining"] = json!(more);
        }
        self.push_json(200, body);
    }

    /// Queues an error reply with one `errors` entry.
    pub fn push_error(&self, status: u16, message: &str) {
        self.push_json(status, json!({ "errors": [{ "message": message }] }));
    }

    /// Queues a 429 with the given per-minute rate-limit headers.
    pub fn push_rate_limited(&self, remaining_minute: u64, limit_minute: u64) {
        self.push(
            MockReply::json(429, &json!({ "message": "API rate limit exceeded" }))
                .with_header(X_RATELIMIT_REMAINING_MIN, &remaining_minute.to_string())
                .with_header(X_RATELIMIT_MIN, &limit_minute.to_string()),
        );
    }

    /// Queues a network failure; see [`MockReply::Network`].
    pub fn push_network_error(&self, message: &str) {
        self.push(MockReply::Network(message.to_string()));
    }

    /// All recorded requests, auth endpoints included.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.read().clone()
    }

    /// Recorded requests to anything but the auth endpoints.
    #[must_use]
    pub fn api_requests(&self) -> Vec<ApiRequest> {
        self.requests
            .read()
            .iter()
            .filter(|r| !is_auth_path(&r.path))
            .cloned()
            .collect()
    }

    /// The last recorded request.
    #[must_use]
    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.read().last().cloned()
    }

    /// Number of requests to `path`.
    #[must_use]
    pub fn count_path(&self, path: &str) -> usize {
        self.requests.read().iter().filter(|r| r.path == path).count()
    }

    /// Total number of recorded requests.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.read().len()
    }

    /// Replies still queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.replies.lock().len()
    }

    fn auth_reply(&self, request: &ApiRequest) -> Option<MockReply> {
        let rejected = || {
            MockReply::json(
                401,
                &json!({ "errors": [{ "message": "invalid credentials" }] }),
            )
        };
        match request.path.as_str() {
            LOGIN_PATH | TOKEN_PATH | LOGOUT_PATH if self.unreachable_auth => {
                Some(MockReply::Network("auth endpoint unreachable".into()))
            }
            LOGIN_PATH if self.reject_auth => Some(rejected()),
            LOGIN_PATH => {
                let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
                Some(
                    MockReply::json(200, &json!({ "items": [] }))
                        .with_header(X_AUTH_TOKEN, &format!("session-{n}")),
                )
            }
            TOKEN_PATH if self.reject_auth => Some(rejected()),
            TOKEN_PATH => {
                let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
                Some(MockReply::json(
                    200,
                    &json!({
                        "access_token": format!("access-{n}"),
                        "issued_token_type": "urn:ietf:params:oauth:token-type:access_token",
                        "token_type": "Bearer",
                        "expires_in": 35999
                    }),
                ))
            }
            LOGOUT_PATH => Some(MockReply::raw(200, "")),
            API_VERSION_PATH => Some(MockReply::json(
                200,
                &json!({ "versions": self.api_versions }),
            )),
            _ => None,
        }
    }
}

fn is_auth_path(path: &str) -> bool {
    matches!(path, LOGIN_PATH | LOGOUT_PATH | TOKEN_PATH | API_VERSION_PATH)
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        self.requests.write().push(request.clone());

        let reply = match self.auth_reply(&request) {
            Some(reply) => reply,
            None => self.replies.lock().pop_front().ok_or_else(|| {
                Error::config(format!(
                    "MockTransport has no reply queued for {} {}",
                    request.method, request.path
                ))
            })?,
        };

        let mut result = reply.into_result();
        if let (Ok(raw), Some(id)) = (&mut result, request.header(X_REQUEST_ID)) {
            if let Ok(value) = HeaderValue::from_str(id) {
                raw.headers.entry(X_REQUEST_ID).or_insert(value);
            }
        }
        result
    }
}
