//! Authentication handling for the FlashBlade SDK.
//!
//! A client authenticates in one of two modes, chosen from the credentials
//! given to the builder:
//!
//! - identity token: an ID token (given directly, or signed from a private key)
//!   is exchanged at `/oauth2/1.0/token` for a bearer access token;
//! - API token: the token is posted to `/api/login` and the session token from
//!   the `x-auth-token` reply header is sent on every call.

mod provider;
mod session;
mod token;

pub use provider::AuthProvider;
pub use session::{ApiTokenManager, LOGIN_PATH, LOGOUT_PATH};
pub use token::{IdentityToken, JwtClaims, JwtSigner, TokenManager, JWT_TTL_SECS, TOKEN_PATH};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::client::{ApiRequest, HttpFailure, RawResponse, Transport, TransportError};
use crate::error::Result;
use crate::headers::X_REQUEST_ID;

/// Produces the auth header for API calls.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Name of the header carrying the credential.
    fn header_name(&self) -> &'static str;

    /// Value of the auth header; `refresh` forces a new token exchange.
    async fn header_value(&self, refresh: bool) -> Result<String>;

    /// The bare token; `refresh` forces a new token exchange.
    async fn token(&self, refresh: bool) -> Result<String>;

    /// Releases the token, server-side where supported.
    async fn dispose(&self) -> Result<()>;
}

/// Sends token-exchange requests straight through the transport, bypassing
/// the dispatcher.
#[derive(Clone)]
pub(crate) struct Exchange {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    user_agent: String,
}

impl Exchange {
    pub(crate) fn new(transport: Arc<dyn Transport>, timeout: Duration, user_agent: String) -> Self {
        Self {
            transport,
            timeout,
            user_agent,
        }
    }

    /// `Ok(Err(_))` is an HTTP failure; network faults are `Err(_)`.
    pub(crate) async fn send(
        &self,
        request: ApiRequest,
    ) -> Result<std::result::Result<RawResponse, HttpFailure>> {
        let mut request = request.with_timeout(self.timeout);
        request.set_header("user-agent", &self.user_agent)?;
        request.set_header(X_REQUEST_ID, &Uuid::new_v4().to_string())?;

        match self.transport.execute(request).await {
            Ok(raw) => Ok(Ok(raw)),
            Err(TransportError::Status(failure)) => Ok(Err(failure)),
            Err(TransportError::Other(e)) => Err(e),
        }
    }
}

impl std::fmt::Debug for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
