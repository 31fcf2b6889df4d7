//! Policies service.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{ListParams, Policy, PolicyMember};
use crate::reference::{process_references, Reference};
use crate::response::Response;

use super::super::dispatch::{ApiCall, Endpoint};
use super::super::ClientCore;

/// Service for snapshot policies and their members.
#[derive(Clone)]
pub struct PoliciesService {
    core: Arc<ClientCore>,
}

impl PoliciesService {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }

    /// Lists policies.
    ///
    /// # Errors
    ///
    /// Fails if `params` carries mixed references, or on network errors.
    pub async fn list(&self, params: &ListParams) -> Result<Response<Policy>> {
        let endpoint = Endpoint::get(self.core.config.api_path("policies"));
        self.core
            .call_api(ApiCall::new(endpoint, params.to_query()?))
            .await
    }

    /// Lists the file systems attached to policies.
    ///
    /// `policies` resolve to `policy_ids` or `policy_names`, `members` to
    /// `member_ids` or `member_names`. Either may be empty. Selectors in
    /// `params` other than paging, filtering and sorting are ignored.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use flashblade_sdk::{Client, ListParams, ResourceRef};
    /// # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let policies = [ResourceRef::by_name("daily")];
    /// let response = client
    ///     .policies()
    ///     .list_file_system_members(&policies, &[] as &[ResourceRef], &ListParams::new())
    ///     .await?
    ///     .into_result()?;
    /// for member in response.into_items().collect_all().await? {
    ///     println!("{:?}", member.member);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if either group mixes id-only and name-only references, or on
    /// network errors.
    pub async fn list_file_system_members<P: Reference, M: Reference>(
        &self,
        policies: &[P],
        members: &[M],
        params: &ListParams,
    ) -> Result<Response<PolicyMember>> {
        let mut query = params.paging_query();
        process_references(policies, &["policy_ids", "policy_names"], &mut query)?;
        process_references(members, &["member_ids", "member_names"], &mut query)?;

        let endpoint = Endpoint::get(self.core.config.api_path("policies/file-systems"));
        self.core.call_api(ApiCall::new(endpoint, query)).await
    }
}

impl std::fmt::Debug for PoliciesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoliciesService").finish_non_exhaustive()
    }
}
