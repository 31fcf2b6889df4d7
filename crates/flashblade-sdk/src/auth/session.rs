//! API-token sessions.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::{Authenticator, Exchange};
use crate::client::ApiRequest;
use crate::error::{Error, Result};
use crate::headers::{API_TOKEN, X_AUTH_TOKEN};

/// Session login endpoint.
pub const LOGIN_PATH: &str = "/api/login";

/// Session logout endpoint.
pub const LOGOUT_PATH: &str = "/api/logout";

/// Trades a long-lived API token for a session token and disposes it on
/// logout.
pub struct ApiTokenManager {
    api_token: SecretString,
    exchange: Exchange,
    session_token: RwLock<Option<SecretString>>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl ApiTokenManager {
    pub(crate) fn new(api_token: SecretString, exchange: Exchange) -> Self {
        Self {
            api_token,
            exchange,
            session_token: RwLock::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn cached(&self) -> Option<String> {
        self.session_token
            .read()
            .as_ref()
            .map(|t| t.expose_secret().clone())
    }

    /// Returns the session token, logging in again when `refresh` is set or no
    /// session exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the login fails, including when
    /// the array cannot be reached, or the reply has no `x-auth-token` header.
    pub async fn get_session_token(&self, refresh: bool) -> Result<String> {
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

        let token = self.login().await?;
        *self.session_token.write() = Some(SecretString::new(token.clone()));
        Ok(token)
    }

    /// Ends the current session on the array and forgets it. Without a
    /// session this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the logout fails.
    pub async fn dispose_session(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        let token = self.session_token.write().take();
        let Some(token) = token else {
            return Ok(());
        };

        let request = ApiRequest::new(Method::POST, LOGOUT_PATH)
            .with_header(X_AUTH_TOKEN, token.expose_secret())?;
        self.exchange
            .send(request)
            .await
            .map_err(|e| Error::authentication(format!("Logout failed: {e}")))?
            .map_err(|failure| Error::authentication(format!("Logout failed: {failure}")))?;

        debug!("session disposed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn login(&self) -> Result<String> {
        let request = ApiRequest::new(Method::POST, LOGIN_PATH)
            .with_header(API_TOKEN, self.api_token.expose_secret())?;

        let raw = self
            .exchange
            .send(request)
            .await
            .map_err(|e| Error::authentication(format!("Login failed: {e}")))?
            .map_err(|failure| Error::authentication(format!("Login failed: {failure}")))?;

        let token = raw
            .header(X_AUTH_TOKEN)
            .ok_or_else(|| Error::authentication("Login reply has no x-auth-token header"))?;

        debug!("session established");
        Ok(token.to_string())
    }
}

#[async_trait]
impl Authenticator for ApiTokenManager {
    fn header_name(&self) -> &'static str {
        X_AUTH_TOKEN
    }

    async fn header_value(&self, refresh: bool) -> Result<String> {
        self.get_session_token(refresh).await
    }

    async fn token(&self, refresh: bool) -> Result<String> {
        self.get_session_token(refresh).await
    }

    async fn dispose(&self) -> Result<()> {
        self.dispose_session().await
    }
}

impl std::fmt::Debug for ApiTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiTokenManager")
            .field("api_token", &"[REDACTED]")
            .field("has_session", &self.session_token.read().is_some())
            .finish_non_exhaustive()
    }
}
