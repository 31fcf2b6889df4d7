//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Default retry budget.
pub const DEFAULT_RETRIES: u32 = 5;

/// Default total timeout of one request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// REST API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2.15";

/// Configuration for a FlashBlade client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the array, e.g. `https://flashblade.example.com`.
    pub target: String,

    /// REST API version, e.g. `2.15`.
    pub api_version: String,

    /// Retry budget shared by all calls.
    pub retries: u32,

    /// Total timeout of one request.
    pub timeout: Duration,

    /// User agent string; the default is derived from the API version.
    pub user_agent: Option<String>,

    /// CA bundle used to verify the array's certificate.
    pub ssl_cert: Option<PathBuf>,

    /// Whether to verify TLS certificates.
    pub verify_ssl: bool,
}

impl ClientConfig {
    /// Creates a configuration for `target`, which may be a bare host name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `target` is empty or not a valid URL.
    pub fn new(target: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            target: normalize_target(target.as_ref())?,
            api_version: DEFAULT_API_VERSION.to_string(),
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            ssl_cert: None,
            verify_ssl: true,
        })
    }

    /// Sets the API version.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Sets the retry budget.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the CA bundle path.
    #[must_use]
    pub fn with_ssl_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssl_cert = Some(path.into());
        self
    }

    /// Sets whether to verify TLS certificates.
    #[must_use]
    pub fn with_verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// Builds the full URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.target, path)
    }

    /// Path of a versioned resource, e.g. `/api/2.15/file-systems`.
    #[must_use]
    pub fn api_path(&self, resource: &str) -> String {
        format!("/api/{}/{}", self.api_version, resource.trim_start_matches('/'))
    }

    /// The configured user agent, or the default one.
    #[must_use]
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| default_user_agent(&self.api_version))
    }
}

/// `flashblade-sdk/<crate version>/FB/<api version>/<os>/<arch>`.
#[must_use]
pub fn default_user_agent(api_version: &str) -> String {
    format!(
        "{}/FB/{}/{}/{}",
        crate::USER_AGENT,
        api_version,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

fn normalize_target(target: &str) -> Result<String> {
    let target = target.trim();
    if target.is_empty() {
        return Err(Error::config("target is required"));
    }

    let with_scheme = if target.contains("://") {
        target.to_string()
    } else {
        format!("https://{target}")
    };
    let url = Url::parse(&with_scheme)
        .map_err(|e| Error::config(format!("Invalid target {target}: {e}")))?;
    if url.host_str().is_none() {
        return Err(Error::config(format!("Invalid target {target}: missing host")));
    }

    Ok(with_scheme.trim_end_matches('/').to_string())
}
