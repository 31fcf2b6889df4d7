//! Header names used by the FlashBlade API and typed views over them.

use reqwest::header::HeaderMap;

/// Session token header used in API-token mode.
pub const X_AUTH_TOKEN: &str = "x-auth-token";
/// Header carrying the API token on login.
pub const API_TOKEN: &str = "api-token";
/// Per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";
/// Per-second request limit.
pub const X_RATELIMIT_SEC: &str = "x-ratelimit-limit-second";
/// Per-minute request limit.
pub const X_RATELIMIT_MIN: &str = "x-ratelimit-limit-minute";
/// Requests left in the current second.
pub const X_RATELIMIT_REMAINING_SEC: &str = "x-ratelimit-remaining-second";
/// Requests left in the current minute.
pub const X_RATELIMIT_REMAINING_MIN: &str = "x-ratelimit-remaining-minute";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name).and_then(|v| v.trim().parse().ok())
}

/// Rate-limit state reported by the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Per-second limit.
    pub limit_second: Option<u64>,
    /// Remaining in the current second.
    pub remaining_second: Option<u64>,
    /// Per-minute limit.
    pub limit_minute: Option<u64>,
    /// Remaining in the current minute.
    pub remaining_minute: Option<u64>,
}

impl RateLimit {
    /// Reads the rate-limit headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit_second: header_u64(headers, X_RATELIMIT_SEC),
            remaining_second: header_u64(headers, X_RATELIMIT_REMAINING_SEC),
            limit_minute: header_u64(headers, X_RATELIMIT_MIN),
            remaining_minute: header_u64(headers, X_RATELIMIT_REMAINING_MIN),
        }
    }

    /// Whether the per-minute window is the one that was exhausted.
    ///
    /// The gateway does not say which window tripped a 429; remaining equal to
    /// limit on the minute window is taken to mean the minute window did.
    #[must_use]
    pub fn minute_window_exhausted(&self) -> bool {
        self.remaining_minute == self.limit_minute
    }
}

/// Headers of interest on a response.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    /// Request id echoed by the server.
    pub x_request_id: Option<String>,
    /// Rate-limit state.
    pub rate_limit: RateLimit,
    /// All headers as received.
    pub raw: HeaderMap,
}

impl ResponseHeaders {
    /// Builds the typed view of a header map.
    #[must_use]
    pub fn from_map(headers: &HeaderMap) -> Self {
        Self {
            x_request_id: header_str(headers, X_REQUEST_ID).map(String::from),
            rate_limit: RateLimit::from_headers(headers),
            raw: headers.clone(),
        }
    }

    /// Returns a header value as a string.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        header_str(&self.raw, name)
    }
}
