//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::{Error, Result};

use super::config::ClientConfig;
use super::transport::{ApiRequest, HttpFailure, RawResponse, RequestBody, Transport, TransportError};

/// Sends requests to the array over HTTPS.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    target: String,
}

impl HttpTransport {
    /// Creates a transport for the configured target.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the CA bundle cannot be read or the
    /// HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent())
            .gzip(true)
            .brotli(true);

        if !config.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(path) = &config.ssl_cert {
            let pem = std::fs::read(path).map_err(|e| {
                Error::config(format!("Cannot read CA certificate {}: {e}", path.display()))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| Error::config(format!("Invalid CA certificate: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            target: config.target.clone(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn execute(&self, request: ApiRequest) -> std::result::Result<RawResponse, TransportError> {
        let url = format!("{}{}", self.target, request.path);
        let mut builder = self.client.request(request.method, url).headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query.to_query_pairs());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match &request.body {
            Some(RequestBody::Json(body)) => builder.json(body),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if status.is_success() {
            Ok(RawResponse {
                status: status.as_u16(),
                headers,
                body,
            })
        } else {
            Err(TransportError::Status(HttpFailure {
                status: status.as_u16(),
                headers,
                body,
            }))
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
