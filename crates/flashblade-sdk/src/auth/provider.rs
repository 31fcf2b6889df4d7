//! Authentication provider selection.

use async_trait::async_trait;

use super::{ApiTokenManager, Authenticator, TokenManager};
use crate::error::Result;

/// The auth mode of a client.
pub enum AuthProvider {
    /// Bearer access tokens from an identity-token exchange.
    IdentityToken(TokenManager),
    /// Session tokens from an API-token login.
    ApiToken(ApiTokenManager),
}

impl AuthProvider {
    /// Header name and value to attach to an API call.
    ///
    /// # Errors
    ///
    /// Fails if a token exchange is needed and fails.
    pub async fn header(&self, refresh: bool) -> Result<(&'static str, String)> {
        Ok((self.header_name(), self.header_value(refresh).await?))
    }

    /// Returns true in API-token mode.
    #[must_use]
    pub fn is_session(&self) -> bool {
        matches!(self, Self::ApiToken(_))
    }
}

#[async_trait]
impl Authenticator for AuthProvider {
    fn header_name(&self) -> &'static str {
        match self {
            Self::IdentityToken(auth) => auth.header_name(),
            Self::ApiToken(auth) => auth.header_name(),
        }
    }

    async fn header_value(&self, refresh: bool) -> Result<String> {
        match self {
            Self::IdentityToken(auth) => auth.header_value(refresh).await,
            Self::ApiToken(auth) => auth.header_value(refresh).await,
        }
    }

    async fn token(&self, refresh: bool) -> Result<String> {
        match self {
            Self::IdentityToken(auth) => auth.token(refresh).await,
            Self::ApiToken(auth) => auth.token(refresh).await,
        }
    }

    async fn dispose(&self) -> Result<()> {
        match self {
            Self::IdentityToken(auth) => auth.dispose().await,
            Self::ApiToken(auth) => auth.dispose().await,
        }
    }
}

impl std::fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdentityToken(auth) => write!(f, "AuthProvider::IdentityToken({auth:?})"),
            Self::ApiToken(auth) => write!(f, "AuthProvider::ApiToken({auth:?})"),
        }
    }
}
