//! File systems service.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{FileSystem, FileSystemPatch, FileSystemPost, ListParams};
use crate::params::Params;
use crate::reference::{process_references, Reference};
use crate::response::Response;

use super::super::dispatch::{ApiCall, Endpoint};
use super::super::ClientCore;

const ID_OR_NAME: [&str; 2] = ["ids", "names"];

/// Service for file systems.
#[derive(Clone)]
pub struct FileSystemsService {
    core: Arc<ClientCore>,
}

impl FileSystemsService {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }

    fn path(&self) -> String {
        self.core.config.api_path("file-systems")
    }

    /// Lists file systems.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use flashblade_sdk::{Client, ListParams};
    /// # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let params = ListParams::new().filter("destroyed='false'").limit(100);
    /// let response = client.file_systems().list(&params).await?.into_result()?;
    ///
    /// println!("{:?} file systems", response.total_item_count);
    /// let mut items = response.into_items();
    /// while let Some(fs) = items.next().await? {
    ///     println!("{:?}: {:?} bytes", fs.name, fs.provisioned);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if `params` carries mixed references, or on network errors.
    pub async fn list(&self, params: &ListParams) -> Result<Response<FileSystem>> {
        let endpoint = Endpoint::get(self.path());
        self.core
            .call_api(ApiCall::new(endpoint, params.to_query()?))
            .await
    }

    /// Creates file systems with the given names and settings.
    ///
    /// # Errors
    ///
    /// Fails if `body` cannot be serialized, or on network errors.
    pub async fn create<I, S>(&self, names: I, body: &FileSystemPost) -> Result<Response<FileSystem>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut query = Params::new();
        query.insert_list("names", names);

        let call = ApiCall::new(Endpoint::post(self.path()), query).with_json(body)?;
        self.core.call_api(call).await
    }

    /// Updates the referenced file systems.
    ///
    /// # Errors
    ///
    /// Fails if `references` mix id-only and name-only entries, or on network
    /// errors.
    pub async fn update<R: Reference>(
        &self,
        references: &[R],
        body: &FileSystemPatch,
    ) -> Result<Response<FileSystem>> {
        let mut query = Params::new();
        process_references(references, &ID_OR_NAME, &mut query)?;

        let call = ApiCall::new(Endpoint::patch(self.path()), query).with_json(body)?;
        self.core.call_api(call).await
    }

    /// Eradicates the referenced file systems. They must be destroyed first.
    ///
    /// # Errors
    ///
    /// Fails if `references` mix id-only and name-only entries, or on network
    /// errors.
    pub async fn delete<R: Reference>(&self, references: &[R]) -> Result<Response<FileSystem>> {
        let mut query = Params::new();
        process_references(references, &ID_OR_NAME, &mut query)?;

        self.core
            .call_api(ApiCall::new(Endpoint::delete(self.path()), query))
            .await
    }
}

impl std::fmt::Debug for FileSystemsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystemsService").finish_non_exhaustive()
    }
}
