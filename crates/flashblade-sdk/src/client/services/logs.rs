//! Log download service.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Method;

use crate::error::Result;
use crate::params::Params;
use crate::response::{raw_payload, Response};

use super::super::dispatch::{ApiCall, Endpoint};
use super::super::ClientCore;

/// Service for downloading array logs.
#[derive(Clone)]
pub struct LogsService {
    core: Arc<ClientCore>,
}

impl LogsService {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }

    /// Downloads the logs between two times, in milliseconds since the epoch.
    /// The archive is the single item of the response.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use flashblade_sdk::Client;
    /// # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let end = chrono::Utc::now().timestamp_millis();
    /// let response = client.logs().download(end - 3_600_000, end).await?.into_result()?;
    /// if let Some(archive) = response.into_items().next().await? {
    ///     std::fs::write("logs.tgz", &archive)?;
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download(&self, start_time: i64, end_time: i64) -> Result<Response<Bytes>> {
        let mut query = Params::new();
        query.insert("start_time", start_time);
        query.insert("end_time", end_time);

        let endpoint = Endpoint::custom(Method::GET, self.core.config.api_path("logs"), raw_payload);
        self.core.call_api(ApiCall::new(endpoint, query)).await
    }
}

impl std::fmt::Debug for LogsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogsService").finish_non_exhaustive()
    }
}
