//! Response envelopes returned by every API call.
//!
//! A call yields [`Response::Valid`] or [`Response::Error`], never both and
//! never neither. Failures the dispatcher understands (4xx, rate limits,
//! exhausted retries) arrive as data in an [`ErrorResponse`].

use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::{HttpFailure, RawResponse};
use crate::error::Result;
use crate::headers::ResponseHeaders;
use crate::pagination::ItemIterator;

/// One error reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// What the error refers to, typically a resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    /// Creates an error entry.
    #[must_use]
    pub fn new(context: Option<String>, message: Option<String>) -> Self {
        Self { context, message }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.context, &self.message) {
            (Some(context), Some(message)) => write!(f, "{context}: {message}"),
            (None, Some(message)) => f.write_str(message),
            (Some(context), None) => f.write_str(context),
            (None, None) => f.write_str("unknown error"),
        }
    }
}

/// A failed call.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub status: u16,
    /// Errors reported by the server.
    pub errors: Vec<ApiError>,
    /// Response headers.
    pub headers: ResponseHeaders,
}

#[derive(Deserialize)]
struct GatewayErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiError>,
}

impl ErrorResponse {
    /// Builds the envelope for an HTTP failure.
    ///
    /// 403 and 429 may come from the gateway in front of the API, whose body is
    /// a single top-level `message`. Everything else carries an `errors` list.
    /// Bodies in neither shape become one entry holding the raw text.
    #[must_use]
    pub fn from_failure(failure: &HttpFailure) -> Self {
        let gateway = || {
            serde_json::from_slice::<GatewayErrorBody>(&failure.body)
                .ok()
                .and_then(|b| b.message)
                .map(|message| vec![ApiError::new(None, Some(message))])
        };
        let structured = || {
            serde_json::from_slice::<ApiErrorBody>(&failure.body)
                .ok()
                .map(|b| b.errors)
                .filter(|errors| !errors.is_empty())
        };

        let errors = match failure.status {
            403 | 429 => gateway().or_else(structured),
            _ => structured(),
        }
        .unwrap_or_else(|| vec![ApiError::new(None, Some(fallback_message(failure)))]);

        Self {
            status: failure.status,
            errors,
            headers: ResponseHeaders::from_map(&failure.headers),
        }
    }
}

fn fallback_message(failure: &HttpFailure) -> String {
    let text = failure.body_text();
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    reqwest::StatusCode::from_u16(failure.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unknown error")
        .to_string()
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        for (i, error) in self.errors.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorResponse {}

/// A successful call.
pub struct ValidResponse<T> {
    /// HTTP status code.
    pub status: u16,
    /// Token for the page after the first one, if any.
    pub continuation_token: Option<String>,
    /// Number of items across all pages, if the server reported it.
    pub total_item_count: Option<u64>,
    /// Whether the server has more items than it returned.
    pub more_items_remaining: Option<bool>,
    /// Aggregate rows, when requested with `total_only` or similar.
    pub total: Option<Vec<T>>,
    /// The items, fetched lazily page by page.
    pub items: ItemIterator<T>,
    /// Response headers of the first page.
    pub headers: ResponseHeaders,
}

impl<T> ValidResponse<T> {
    /// Consumes the response, returning its item iterator.
    #[must_use]
    pub fn into_items(self) -> ItemIterator<T> {
        self.items
    }
}

impl<T> fmt::Debug for ValidResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidResponse")
            .field("status", &self.status)
            .field("continuation_token", &self.continuation_token)
            .field("total_item_count", &self.total_item_count)
            .field("more_items_remaining", &self.more_items_remaining)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

/// Outcome of an API call.
#[derive(Debug)]
pub enum Response<T> {
    /// The call succeeded.
    Valid(ValidResponse<T>),
    /// The call failed with a classified HTTP error.
    Error(ErrorResponse),
}

impl<T> Response<T> {
    /// HTTP status of the final attempt.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Valid(r) => r.status,
            Self::Error(r) => r.status,
        }
    }

    /// Returns true for [`Response::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`ErrorResponse`] if the call failed.
    pub fn into_result(self) -> std::result::Result<ValidResponse<T>, ErrorResponse> {
        match self {
            Self::Valid(r) => Ok(r),
            Self::Error(r) => Err(r),
        }
    }

    /// Returns the error envelope, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Valid(_) => None,
            Self::Error(r) => Some(r),
        }
    }
}

/// One page of a collection response.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Page<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Token for the next page.
    #[serde(default)]
    pub continuation_token: Option<String>,
    /// Number of items across all pages.
    #[serde(default)]
    pub total_item_count: Option<u64>,
    /// Whether more items remain after this page.
    #[serde(default)]
    pub more_items_remaining: Option<bool>,
    /// Aggregate rows.
    #[serde(default)]
    pub total: Option<Vec<T>>,
}

impl<T> Page<T> {
    /// A page with no items and no continuation.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_items(Vec::new())
    }

    /// A final page holding `items`.
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            items,
            continuation_token: None,
            total_item_count: None,
            more_items_remaining: None,
            total: None,
        }
    }
}

/// Shape of a successful body, decided once by the endpoint's builder.
#[derive(Debug)]
pub enum ResponseBody<T> {
    /// A paginated `items` collection.
    Collection(Page<T>),
    /// A bare payload, such as a downloaded file.
    Singleton(T),
}

impl<T> ResponseBody<T> {
    /// Views the body as a page; a singleton becomes a one-item final page.
    #[must_use]
    pub fn into_page(self) -> Page<T> {
        match self {
            Self::Collection(page) => page,
            Self::Singleton(item) => Page::from_items(vec![item]),
        }
    }
}

/// Converts a successful reply into a [`ResponseBody`].
pub type ResponseBuilder<T> = fn(&RawResponse) -> Result<ResponseBody<T>>;

/// Default builder: JSON with an `items` array is a collection, any other JSON
/// document is a singleton, and an empty body is an empty collection.
///
/// # Errors
///
/// Returns a serialization error if the body does not decode into `T`.
pub fn json_page<T: DeserializeOwned>(raw: &RawResponse) -> Result<ResponseBody<T>> {
    if raw.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResponseBody::Collection(Page::empty()));
    }

    let document: serde_json::Value = serde_json::from_slice(&raw.body)?;
    if document.get("items").is_some() {
        Ok(ResponseBody::Collection(serde_json::from_value(document)?))
    } else {
        Ok(ResponseBody::Singleton(serde_json::from_value(document)?))
    }
}

/// Builder for endpoints that return a file: the whole body is one item.
///
/// # Errors
///
/// Never fails; the signature matches [`ResponseBuilder`].
pub fn raw_payload(raw: &RawResponse) -> Result<ResponseBody<Bytes>> {
    Ok(ResponseBody::Singleton(raw.body.clone()))
}
