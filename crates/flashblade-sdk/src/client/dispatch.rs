//! The call dispatcher: attempt, classify, retry.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::headers::{RateLimit, ResponseHeaders, X_REQUEST_ID};
use crate::pagination::ItemIterator;
use crate::params::Params;
use crate::response::{
    json_page, ErrorResponse, Page, Response, ResponseBody, ResponseBuilder, ValidResponse,
};

use super::transport::{ApiRequest, HttpFailure, RawResponse, RequestBody, TransportError};
use super::ClientCore;

/// Sleep before retrying a 429 caused by the per-minute window.
pub const MINUTE_BACKOFF: Duration = Duration::from_secs(60);

/// Sleep before retrying a 429 caused by the per-second window.
pub const SECOND_BACKOFF: Duration = Duration::from_secs(1);

/// An API operation: method, path, and how to read its reply.
pub struct Endpoint<T> {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the target.
    pub path: String,
    /// Converts a successful reply into items.
    pub builder: ResponseBuilder<T>,
}

impl<T: DeserializeOwned> Endpoint<T> {
    /// Creates an endpoint using the default JSON builder.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            builder: json_page::<T>,
        }
    }

    /// A `GET` endpoint.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` endpoint.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// A `PATCH` endpoint.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// A `DELETE` endpoint.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }
}

impl<T> Endpoint<T> {
    /// Creates an endpoint with a custom response builder.
    pub fn custom(method: Method, path: impl Into<String>, builder: ResponseBuilder<T>) -> Self {
        Self {
            method,
            path: path.into(),
            builder,
        }
    }

    /// Replaces the response builder.
    #[must_use]
    pub fn with_builder<U>(self, builder: ResponseBuilder<U>) -> Endpoint<U> {
        Endpoint {
            method: self.method,
            path: self.path,
            builder,
        }
    }
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            path: self.path.clone(),
            builder: self.builder,
        }
    }
}

impl<T> std::fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// One invocation of an endpoint with resolved arguments.
pub struct ApiCall<T> {
    /// The endpoint.
    pub endpoint: Endpoint<T>,
    /// Query parameters.
    pub params: Params,
    /// Optional body.
    pub body: Option<RequestBody>,
    /// Request id; generated when absent.
    pub request_id: Option<String>,
}

impl<T> ApiCall<T> {
    /// Creates a call without a body.
    pub fn new(endpoint: Endpoint<T>, params: Params) -> Self {
        Self {
            endpoint,
            params,
            body: None,
            request_id: None,
        }
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `body` cannot be encoded.
    pub fn with_json<B: serde::Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Uses a caller-supplied request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl<T> Clone for ApiCall<T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            params: self.params.clone(),
            body: self.body.clone(),
            request_id: self.request_id.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ApiCall<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCall")
            .field("endpoint", &self.endpoint)
            .field("params", &self.params)
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

/// What to do after an HTTP failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Return the failure as an [`ErrorResponse`].
    Fail,
    /// Refresh the auth header, then retry.
    Reauthenticate,
    /// Sleep, then retry.
    Backoff(Duration),
    /// Retry immediately.
    RetryNow,
    /// Give up with [`Error::UnexpectedStatus`].
    Fatal,
}

/// Classifies an HTTP failure given the retries left for this call.
///
/// Order matters: an exhausted budget fails every status, 400/404 and 500 are
/// never retried, 401/403 re-authenticate, 429 backs off for 60 s or 1 s
/// depending on which rate-limit window tripped, anything above 500 retries
/// at once, and all other statuses are fatal.
#[must_use]
pub fn classify(status: u16, retries_left: u32, rate_limit: &RateLimit) -> RetryAction {
    if retries_left == 0 {
        return RetryAction::Fail;
    }
    match status {
        400 | 404 | 500 => RetryAction::Fail,
        401 | 403 => RetryAction::Reauthenticate,
        429 if rate_limit.minute_window_exhausted() => RetryAction::Backoff(MINUTE_BACKOFF),
        429 => RetryAction::Backoff(SECOND_BACKOFF),
        s if s > 500 => RetryAction::RetryNow,
        _ => RetryAction::Fatal,
    }
}

impl ClientCore {
    /// Runs a call to completion and wraps the result in an envelope.
    pub(crate) async fn call_api<T>(self: &Arc<Self>, mut call: ApiCall<T>) -> Result<Response<T>> {
        let request_id = call
            .request_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        let raw = match self.dispatch(&call, &request_id).await? {
            Ok(raw) => raw,
            Err(failure) => return Ok(Response::Error(ErrorResponse::from_failure(&failure))),
        };

        let status = raw.status;
        let headers = ResponseHeaders::from_map(&raw.headers);
        let response = match (call.endpoint.builder)(&raw)? {
            ResponseBody::Singleton(item) => ValidResponse {
                status,
                continuation_token: None,
                total_item_count: None,
                more_items_remaining: None,
                total: None,
                items: ItemIterator::from_items(vec![item]),
                headers,
            },
            ResponseBody::Collection(Page {
                items,
                continuation_token,
                total_item_count,
                more_items_remaining,
                total,
            }) => ValidResponse {
                status,
                items: ItemIterator::new(
                    Arc::clone(self),
                    call,
                    continuation_token.clone(),
                    total_item_count,
                    items,
                    request_id,
                    more_items_remaining,
                ),
                continuation_token,
                total_item_count,
                more_items_remaining,
                total,
                headers,
            },
        };

        Ok(Response::Valid(response))
    }

    /// Runs a call and returns its page, for follow-up page fetches.
    pub(crate) async fn fetch_page<T>(
        &self,
        call: &ApiCall<T>,
    ) -> Result<std::result::Result<Page<T>, ErrorResponse>> {
        let request_id = call
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        match self.dispatch(call, &request_id).await? {
            Ok(raw) => Ok(Ok((call.endpoint.builder)(&raw)?.into_page())),
            Err(failure) => Ok(Err(ErrorResponse::from_failure(&failure))),
        }
    }

    /// The retry loop. `Ok(Err(_))` is a terminal HTTP failure; `Err(_)` is a
    /// failure that must not be turned into an envelope.
    #[instrument(
        skip(self, call, request_id),
        fields(method = %call.endpoint.method, path = %call.endpoint.path, request_id = %request_id)
    )]
    async fn dispatch<T>(
        &self,
        call: &ApiCall<T>,
        request_id: &str,
    ) -> Result<std::result::Result<RawResponse, HttpFailure>> {
        let mut refresh_auth = false;

        loop {
            let request = self.prepare(call, request_id, refresh_auth).await?;
            refresh_auth = false;

            let failure = match self.transport.execute(request).await {
                Ok(raw) => {
                    debug!(status = raw.status, "request succeeded");
                    return Ok(Ok(raw));
                }
                Err(TransportError::Other(e)) => return Err(e),
                Err(TransportError::Status(failure)) => failure,
            };

            let status = failure.status;
            let retries = self.retries.load(Ordering::SeqCst);
            let action = classify(status, retries, &RateLimit::from_headers(&failure.headers));
            if matches!(
                action,
                RetryAction::Reauthenticate | RetryAction::Backoff(_) | RetryAction::RetryNow
            ) && !self.take_retry()
            {
                debug!(status, "retry budget exhausted");
                return Ok(Err(failure));
            }

            match action {
                RetryAction::Fail => {
                    debug!(status, retries_left = retries, "request failed");
                    return Ok(Err(failure));
                }
                RetryAction::Fatal => {
                    warn!(status, "unexpected status");
                    return Err(Error::UnexpectedStatus {
                        status,
                        body: failure.body_text(),
                    });
                }
                RetryAction::Reauthenticate => {
                    warn!(status, retries_left = retries, "authentication rejected, refreshing token");
                    refresh_auth = true;
                }
                RetryAction::Backoff(delay) => {
                    warn!(
                        status,
                        retries_left = retries,
                        backoff_ms = delay.as_millis(),
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryAction::RetryNow => {
                    warn!(status, retries_left = retries, "server error, retrying");
                }
            }
        }
    }

    /// Spends one retry from the client-wide budget. Returns false when the
    /// budget is already empty.
    fn take_retry(&self) -> bool {
        self.retries
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |r| r.checked_sub(1))
            .is_ok()
    }

    async fn prepare<T>(
        &self,
        call: &ApiCall<T>,
        request_id: &str,
        refresh_auth: bool,
    ) -> Result<ApiRequest> {
        let (auth_header, auth_value) = self.auth.header(refresh_auth).await?;

        let mut request = ApiRequest::new(call.endpoint.method.clone(), call.endpoint.path.clone())
            .with_query(call.params.clone())
            .with_timeout(self.config.timeout);
        request.body = call.body.clone();
        request.set_header(auth_header, &auth_value)?;
        request.set_header(X_REQUEST_ID, request_id)?;
        request.set_header("user-agent", &self.user_agent)?;
        Ok(request)
    }
}
