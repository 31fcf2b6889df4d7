//! Client builder for fluent configuration.

use std::path::PathBuf;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::auth::{ApiTokenManager, AuthProvider, Exchange, IdentityToken, JwtSigner, TokenManager};
use crate::error::{Error, Result};

use super::config::ClientConfig;
use super::http::HttpTransport;
use super::transport::Transport;
use super::{Client, ClientCore};

/// Builder for creating a [`Client`].
///
/// Exactly one credential style must be given: an `api_token`, an `id_token`,
/// or a private key together with `key_id`, `issuer`, `client_id` and
/// `username`. Building never touches the network; tokens are exchanged on
/// the first call.
///
/// # Example
///
/// ```rust,no_run
/// use flashblade_sdk::Client;
/// use std::time::Duration;
///
/// let client = Client::builder()
///     .target("flashblade.example.com")
///     .private_key_file("/etc/fb/client.pem")
///     .key_id("2a1b9c8d")
///     .issuer("automation")
///     .client_id("5f0a9c1e")
///     .username("pureuser")
///     .timeout(Duration::from_secs(30))
///     .retries(3)
///     .build()?;
/// # Ok::<(), flashblade_sdk::Error>(())
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    target: Option<String>,
    id_token: Option<SecretString>,
    private_key_file: Option<PathBuf>,
    private_key_pem: Option<Vec<u8>>,
    username: Option<String>,
    client_id: Option<String>,
    key_id: Option<String>,
    issuer: Option<String>,
    api_token: Option<SecretString>,
    retries: Option<u32>,
    timeout: Option<Duration>,
    ssl_cert: Option<PathBuf>,
    verify_ssl: Option<bool>,
    user_agent: Option<String>,
    api_version: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the array to talk to: a host name, an address, or a URL.
    ///
    /// This is required and must be called before [`build()`](Self::build).
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Authenticates with a pre-issued ID token.
    #[must_use]
    pub fn id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(SecretString::new(token.into()));
        self
    }

    /// Signs ID tokens with the RSA private key in this PEM file.
    #[must_use]
    pub fn private_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key_file = Some(path.into());
        self
    }

    /// Signs ID tokens with this PEM-encoded RSA private key.
    #[must_use]
    pub fn private_key_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.private_key_pem = Some(pem.into());
        self
    }

    /// Array user the signed ID token acts for.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Id of the API client registered on the array.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Id of the API client's public key.
    #[must_use]
    pub fn key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Issuer name of the API client.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Authenticates with an API token and session login.
    ///
    /// This is mutually exclusive with every identity-token setting.
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::new(token.into()));
        self
    }

    /// Sets the retry budget shared by every call of the client.
    ///
    /// Default: 5.
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Sets the total timeout of each request.
    ///
    /// Default: 15 seconds.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Verifies the array's certificate against this CA bundle.
    #[must_use]
    pub fn ssl_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssl_cert = Some(path.into());
        self
    }

    /// Sets whether to verify TLS certificates.
    ///
    /// Default: true.
    ///
    /// # Security Warning
    ///
    /// Disabling verification is insecure and should only be used with
    /// self-signed certificates on trusted networks.
    #[must_use]
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = Some(verify);
        self
    }

    /// Sets the user agent string.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the REST API version.
    ///
    /// Default: `2.15`.
    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Sends requests through a custom transport instead of HTTPS.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    fn has_identity_settings(&self) -> bool {
        self.id_token.is_some()
            || self.private_key_file.is_some()
            || self.private_key_pem.is_some()
            || self.username.is_some()
            || self.client_id.is_some()
            || self.key_id.is_some()
            || self.issuer.is_some()
    }

    fn identity_token(&mut self) -> Result<IdentityToken> {
        if let Some(token) = self.id_token.take() {
            if self.private_key_file.is_some() || self.private_key_pem.is_some() {
                return Err(Error::config(
                    "id_token cannot be combined with a private key",
                ));
            }
            return Ok(IdentityToken::Static(token));
        }

        let missing: Vec<&str> = [
            ("key_id", self.key_id.is_none()),
            ("issuer", self.issuer.is_none()),
            ("client_id", self.client_id.is_none()),
            ("username", self.username.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if !missing.is_empty() {
            return Err(Error::config(format!(
                "Signing identity tokens requires {}",
                missing.join(", ")
            )));
        }

        let key_id = self.key_id.take().unwrap_or_default();
        let issuer = self.issuer.take().unwrap_or_default();
        let client_id = self.client_id.take().unwrap_or_default();
        let username = self.username.take().unwrap_or_default();

        let signer = match (self.private_key_file.take(), self.private_key_pem.take()) {
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "private_key_file and private_key_pem are mutually exclusive",
                ))
            }
            (Some(path), None) => JwtSigner::from_pem_file(path, key_id, issuer, client_id, username)?,
            (None, Some(pem)) => JwtSigner::from_pem(&pem, key_id, issuer, client_id, username)?,
            (None, None) => {
                return Err(Error::config(
                    "Identity-token authentication requires id_token or a private key",
                ))
            }
        };
        Ok(IdentityToken::Signed(signer))
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the target is missing or invalid, if
    /// the credentials are missing, incomplete or of both styles, or if a key
    /// or CA file cannot be read.
    pub fn build(mut self) -> Result<Client> {
        let target = self
            .target
            .take()
            .ok_or_else(|| Error::config("target is required"))?;

        let mut config = ClientConfig::new(target)?;
        if let Some(api_version) = self.api_version.take() {
            config = config.with_api_version(api_version);
        }
        if let Some(retries) = self.retries {
            config = config.with_retries(retries);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent.take() {
            config = config.with_user_agent(user_agent);
        }
        if let Some(path) = self.ssl_cert.take() {
            config = config.with_ssl_cert(path);
        }
        if let Some(verify) = self.verify_ssl {
            config = config.with_verify_ssl(verify);
        }

        enum Credentials {
            Identity(IdentityToken),
            ApiToken(SecretString),
        }

        let credentials = match self.api_token.take() {
            Some(_) if self.has_identity_settings() => {
                return Err(Error::config(
                    "api_token cannot be combined with identity-token credentials",
                ))
            }
            Some(token) => Credentials::ApiToken(token),
            None if self.has_identity_settings() => Credentials::Identity(self.identity_token()?),
            None => {
                return Err(Error::config(
                    "No credentials: set api_token, id_token, or a private key",
                ))
            }
        };

        let transport = match self.transport.take() {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&config)?),
        };

        let user_agent = config.user_agent();
        let exchange = Exchange::new(Arc::clone(&transport), config.timeout, user_agent.clone());
        let auth = match credentials {
            Credentials::Identity(identity) => {
                AuthProvider::IdentityToken(TokenManager::new(identity, exchange.clone()))
            }
            Credentials::ApiToken(token) => {
                AuthProvider::ApiToken(ApiTokenManager::new(token, exchange.clone()))
            }
        };

        Ok(Client {
            core: Arc::new(ClientCore {
                retries: AtomicU32::new(config.retries),
                config,
                transport,
                auth,
                exchange,
                user_agent,
            }),
        })
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("target", &self.target)
            .field("has_id_token", &self.id_token.is_some())
            .field("private_key_file", &self.private_key_file)
            .field("has_private_key_pem", &self.private_key_pem.is_some())
            .field("username", &self.username)
            .field("client_id", &self.client_id)
            .field("key_id", &self.key_id)
            .field("issuer", &self.issuer)
            .field("has_api_token", &self.api_token.is_some())
            .field("retries", &self.retries)
            .field("timeout", &self.timeout)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}
