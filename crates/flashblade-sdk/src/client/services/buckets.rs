//! Buckets service.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Bucket, ListParams};
use crate::response::Response;

use super::super::dispatch::{ApiCall, Endpoint};
use super::super::ClientCore;

/// Service for object store buckets.
#[derive(Clone)]
pub struct BucketsService {
    core: Arc<ClientCore>,
}

impl BucketsService {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }

    /// Lists buckets.
    ///
    /// # Errors
    ///
    /// Fails if `params` carries mixed references, or on network errors.
    pub async fn list(&self, params: &ListParams) -> Result<Response<Bucket>> {
        let endpoint = Endpoint::get(self.core.config.api_path("buckets"));
        self.core
            .call_api(ApiCall::new(endpoint, params.to_query()?))
            .await
    }
}

impl std::fmt::Debug for BucketsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketsService").finish_non_exhaustive()
    }
}
