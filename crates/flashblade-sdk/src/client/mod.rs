//! FlashBlade API client implementation.
//!
//! This module provides the main client for interacting with a FlashBlade
//! array, the transport seam beneath it, and the call dispatcher.

mod builder;
mod config;
mod dispatch;
mod http;
mod services;
mod transport;

pub use builder::ClientBuilder;
pub use config::{
    default_user_agent, ClientConfig, DEFAULT_API_VERSION, DEFAULT_RETRIES, DEFAULT_TIMEOUT,
};
pub use dispatch::{classify, ApiCall, Endpoint, RetryAction, MINUTE_BACKOFF, SECOND_BACKOFF};
pub use http::HttpTransport;
pub use services::{ArraysService, BucketsService, FileSystemsService, LogsService, PoliciesService};
pub use transport::{ApiRequest, HttpFailure, RawResponse, RequestBody, Transport, TransportError};

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info};

use crate::auth::{AuthProvider, Authenticator, Exchange};
use crate::error::{Error, Result};
use crate::models::ApiVersions;
use crate::response::Response;

/// Unauthenticated version discovery endpoint.
pub const API_VERSION_PATH: &str = "/api/api_version";

/// State shared by a client, its services and its item iterators.
pub(crate) struct ClientCore {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) auth: AuthProvider,
    pub(crate) exchange: Exchange,
    pub(crate) retries: AtomicU32,
    pub(crate) user_agent: String,
}

/// The main client for interacting with a FlashBlade array.
///
/// Use [`Client::builder()`] to create a new client instance. Clones share
/// the session, the cached tokens and the retry budget.
///
/// # Example
///
/// ```rust,no_run
/// use flashblade_sdk::{Client, ListParams};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::builder()
///         .target("flashblade.example.com")
///         .api_token("T-0b8a7f36-1c5e-4f1a-9d7e-6b2e4c3a1f00")
///         .build()?;
///
///     let response = client.file_systems().list(&ListParams::new()).await?;
///     match response.into_result() {
///         Ok(valid) => {
///             for fs in valid.into_items().collect_all().await? {
///                 println!("File system: {:?}", fs.name);
///             }
///         }
///         Err(error) => eprintln!("{error}"),
///     }
///
///     client.logout().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    core: Arc<ClientCore>,
}

impl Client {
    /// Creates a new client builder.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.core.config
    }

    /// Base URL of the array.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.core.config.target
    }

    /// REST API version used for every call.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.core.config.api_version
    }

    /// Retries the client has left; each retried failure spends one, and
    /// [`logout`](Self::logout) drops it to zero.
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.core.retries.load(Ordering::SeqCst)
    }

    /// User agent sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.core.user_agent
    }

    /// Returns the bearer access token or the session token, depending on
    /// the auth mode. `refresh` forces a new exchange.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the exchange fails.
    pub async fn get_access_token(&self, refresh: bool) -> Result<String> {
        self.core.auth.token(refresh).await
    }

    /// Ends the session and disables retries for the rest of the client's life.
    ///
    /// In API-token mode the session is disposed on the array; in either mode
    /// cached tokens are dropped, so a later call authenticates again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the array rejects the logout.
    pub async fn logout(&self) -> Result<()> {
        self.core.retries.store(0, Ordering::SeqCst);
        self.core.auth.dispose().await?;
        info!(array = %self.core.config.target, "logged out");
        Ok(())
    }

    /// Lists the REST versions the array supports. Needs no credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] on any non-2xx reply.
    pub async fn api_versions(&self) -> Result<ApiVersions> {
        let request = ApiRequest::new(Method::GET, API_VERSION_PATH);
        let raw = self.core.exchange.send(request).await?.map_err(|failure| {
            Error::UnexpectedStatus {
                status: failure.status,
                body: failure.body_text(),
            }
        })?;
        let versions: ApiVersions = serde_json::from_slice(&raw.body)?;
        debug!(versions = ?versions.versions, "api versions");
        Ok(versions)
    }

    /// Runs a hand-built call through the dispatcher.
    ///
    /// # Errors
    ///
    /// See [`Error`]; classified HTTP failures come back as
    /// [`Response::Error`] instead.
    pub async fn call<T>(&self, call: ApiCall<T>) -> Result<Response<T>> {
        self.core.call_api(call).await
    }

    /// Builds a versioned resource path, e.g. `/api/2.15/file-systems`.
    #[must_use]
    pub fn api_path(&self, resource: &str) -> String {
        self.core.config.api_path(resource)
    }

    // ========================================================================
    // Service accessors
    // ========================================================================

    /// Returns the arrays service.
    #[must_use]
    pub fn arrays(&self) -> ArraysService {
        ArraysService::new(Arc::clone(&self.core))
    }

    /// Returns the file systems service.
    #[must_use]
    pub fn file_systems(&self) -> FileSystemsService {
        FileSystemsService::new(Arc::clone(&self.core))
    }

    /// Returns the buckets service.
    #[must_use]
    pub fn buckets(&self) -> BucketsService {
        BucketsService::new(Arc::clone(&self.core))
    }

    /// Returns the policies service.
    #[must_use]
    pub fn policies(&self) -> PoliciesService {
        PoliciesService::new(Arc::clone(&self.core))
    }

    /// Returns the log download service.
    #[must_use]
    pub fn logs(&self) -> LogsService {
        LogsService::new(Arc::clone(&self.core))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("target", &self.core.config.target)
            .field("api_version", &self.core.config.api_version)
            .field("auth", &self.core.auth)
            .finish_non_exhaustive()
    }
}
