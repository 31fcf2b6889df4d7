//! Arrays service.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Array;
use crate::params::Params;
use crate::response::Response;

use super::super::dispatch::{ApiCall, Endpoint};
use super::super::ClientCore;

/// Service for the array itself.
#[derive(Clone)]
pub struct ArraysService {
    core: Arc<ClientCore>,
}

impl ArraysService {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }

    /// Returns the array's identity and software version.
    ///
    /// # Errors
    ///
    /// Fails on authentication or network errors.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use flashblade_sdk::Client;
    /// # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let arrays = client.arrays().list().await?.into_result()?;
    /// for array in arrays.items.collect_all().await? {
    ///     println!("{:?} runs {:?}", array.name, array.version);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list(&self) -> Result<Response<Array>> {
        let endpoint = Endpoint::get(self.core.config.api_path("arrays"));
        self.core.call_api(ApiCall::new(endpoint, Params::new())).await
    }
}

impl std::fmt::Debug for ArraysService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArraysService").finish_non_exhaustive()
    }
}
