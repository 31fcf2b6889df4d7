//! Identity-token exchange for bearer access tokens.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::RwLock;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{Authenticator, Exchange};
use crate::client::{ApiRequest, RequestBody};
use crate::error::{Error, Result};

/// OAuth2 token-exchange endpoint.
pub const TOKEN_PATH: &str = "/oauth2/1.0/token";

/// Lifetime of a signed identity token, in seconds.
pub const JWT_TTL_SECS: i64 = 24 * 60 * 60;

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
const SUBJECT_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:jwt";

/// Claims of a signed identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issuer, the name of the API client registration.
    pub iss: String,
    /// Audience, the API client id.
    pub aud: String,
    /// Subject, the array user the token acts for.
    pub sub: String,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Signs identity tokens with an RS256 private key.
#[derive(Clone)]
pub struct JwtSigner {
    key: EncodingKey,
    key_id: String,
    issuer: String,
    client_id: String,
    username: String,
}

impl JwtSigner {
    /// Creates a signer from a PEM-encoded RSA private key.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key cannot be parsed.
    pub fn from_pem(
        pem: &[u8],
        key_id: impl Into<String>,
        issuer: impl Into<String>,
        client_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(pem)
            .map_err(|e| Error::config(format!("Invalid private key: {e}")))?;
        Ok(Self {
            key,
            key_id: key_id.into(),
            issuer: issuer.into(),
            client_id: client_id.into(),
            username: username.into(),
        })
    }

    /// Creates a signer from a PEM file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn from_pem_file(
        path: impl AsRef<Path>,
        key_id: impl Into<String>,
        issuer: impl Into<String>,
        client_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|e| {
            Error::config(format!("Cannot read private key {}: {e}", path.display()))
        })?;
        Self::from_pem(&pem, key_id, issuer, client_id, username)
    }

    /// Claims for a token issued now.
    #[must_use]
    pub fn claims(&self) -> JwtClaims {
        let iat = Utc::now().timestamp();
        JwtClaims {
            iss: self.issuer.clone(),
            aud: self.client_id.clone(),
            sub: self.username.clone(),
            iat,
            exp: iat + JWT_TTL_SECS,
        }
    }

    /// Signs a fresh identity token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Jwt`] if signing fails.
    pub fn sign(&self) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key_id.clone());
        Ok(jsonwebtoken::encode(&header, &self.claims(), &self.key)?)
    }
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("key_id", &self.key_id)
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Where the identity token comes from.
#[derive(Clone)]
pub enum IdentityToken {
    /// A pre-issued ID token.
    Static(SecretString),
    /// A token signed on every exchange.
    Signed(JwtSigner),
}

impl IdentityToken {
    /// Wraps a pre-issued ID token.
    #[must_use]
    pub fn id_token(token: impl Into<String>) -> Self {
        Self::Static(SecretString::new(token.into()))
    }

    fn subject_token(&self) -> Result<String> {
        match self {
            Self::Static(token) => Ok(token.expose_secret().clone()),
            Self::Signed(signer) => signer.sign(),
        }
    }
}

impl std::fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("IdentityToken::Static([REDACTED])"),
            Self::Signed(signer) => write!(f, "IdentityToken::Signed({signer:?})"),
        }
    }
}

#[derive(Deserialize)]
struct TokenReply {
    access_token: String,
}

/// Exchanges an identity token for a bearer access token and caches it.
pub struct TokenManager {
    identity: IdentityToken,
    exchange: Exchange,
    access_token: RwLock<Option<SecretString>>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl TokenManager {
    pub(crate) fn new(identity: IdentityToken, exchange: Exchange) -> Self {
        Self {
            identity,
            exchange,
            access_token: RwLock::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn cached(&self) -> Option<String> {
        self.access_token
            .read()
            .as_ref()
            .map(|t| t.expose_secret().clone())
    }

    /// Returns the access token, exchanging for a new one when `refresh` is
    /// set or nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the exchange fails, including
    /// when the array cannot be reached, or the reply carries no access token.
    pub async fn get_access_token(&self, refresh: bool) -> Result<String> {
        if !refresh {
            if let Some(token) = self.cached() {
                return Ok(token);
            }
        }

        let _guard = self.refresh_lock.lock().await;
        if !refresh {
            if let Some(token) = self.cached() {
                return Ok(token);
            }
        }

        let token = self.exchange_token().await?;
        *self.access_token.write() = Some(SecretString::new(token.clone()));
        Ok(token)
    }

    /// Returns the `Authorization` header value.
    ///
    /// # Errors
    ///
    /// See [`get_access_token`](Self::get_access_token).
    pub async fn get_header(&self, refresh: bool) -> Result<String> {
        Ok(format!("Bearer {}", self.get_access_token(refresh).await?))
    }

    /// Drops the cached access token.
    pub fn clear(&self) {
        *self.access_token.write() = None;
    }

    #[instrument(skip(self))]
    async fn exchange_token(&self) -> Result<String> {
        let subject_token = self
            .identity
            .subject_token()
            .map_err(|e| Error::authentication(format!("Cannot sign identity token: {e}")))?;

        let request = ApiRequest::new(Method::POST, TOKEN_PATH).with_body(RequestBody::Form(vec![
            ("grant_type".to_string(), GRANT_TYPE.to_string()),
            ("subject_token".to_string(), subject_token),
            ("subject_token_type".to_string(), SUBJECT_TOKEN_TYPE.to_string()),
        ]));

        let raw = self
            .exchange
            .send(request)
            .await
            .map_err(|e| Error::authentication(format!("Token exchange failed: {e}")))?
            .map_err(|failure| {
                Error::authentication(format!("Token exchange failed: {failure}"))
            })?;
        let reply: TokenReply = serde_json::from_slice(&raw.body).map_err(|e| {
            Error::authentication(format!("Malformed token exchange reply: {e}"))
        })?;

        debug!("access token acquired");
        Ok(reply.access_token)
    }
}

#[async_trait]
impl Authenticator for TokenManager {
    fn header_name(&self) -> &'static str {
        "authorization"
    }

    async fn header_value(&self, refresh: bool) -> Result<String> {
        self.get_header(refresh).await
    }

    async fn token(&self, refresh: bool) -> Result<String> {
        self.get_access_token(refresh).await
    }

    async fn dispose(&self) -> Result<()> {
        self.clear();
        Ok(())
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("identity", &self.identity)
            .field("has_access_token", &self.access_token.read().is_some())
            .finish_non_exhaustive()
    }
}
