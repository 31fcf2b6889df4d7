//! Error types for the FlashBlade SDK.
//!
//! HTTP failures that the dispatcher knows how to classify never show up here;
//! they are returned as data in an [`ErrorResponse`](crate::response::ErrorResponse).
//! This type covers what is left: misconfiguration, authentication exchange
//! failures, network faults and the unclassified-status case.

use crate::response::ApiError;

/// The main error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client or a request was configured incorrectly.
    ///
    /// Raised before any network activity: conflicting or incomplete
    /// credentials, mixed reference batches, unreadable certificates.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// Exchanging credentials for an access or session token failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Error message.
        message: String,
    },

    /// The server answered with a status the dispatcher does not classify.
    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },

    /// Fetching a follow-up page of a paginated result failed.
    #[error("Failed to fetch next page (status {status}): {}", format_errors(.errors))]
    PageFetch {
        /// HTTP status of the failed page request.
        status: u16,
        /// Errors reported by the server.
        errors: Vec<ApiError>,
    },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Error serializing a request or deserializing a response.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error while reading key or certificate files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error signing an identity token.
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns the HTTP status code if applicable.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } | Self::PageFetch { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn format_errors(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;
