//! Common types used across the SDK.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pagination::CONTINUATION_TOKEN;
use crate::params::Params;
use crate::reference::{process_references, Reference, ResourceRef};

/// Fields the array returned that no model field covers.
pub type Extra = BTreeMap<String, serde_json::Value>;

/// Query options shared by list endpoints.
///
/// # Example
///
/// ```
/// use flashblade_sdk::ListParams;
///
/// let params = ListParams::new()
///     .filter("destroyed='false'")
///     .limit(100)
///     .sort_by("name", true);
///
/// let query = params.to_query()?;
/// assert_eq!(query.to_query_string(), "filter=destroyed%3D%27false%27&limit=100&sort=name-");
/// # Ok::<(), flashblade_sdk::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    /// Token from a previous response to resume from.
    pub continuation_token: Option<String>,
    /// Filter expression, e.g. `name='fs1'`.
    pub filter: Option<String>,
    /// Maximum number of items per page.
    pub limit: Option<u32>,
    /// Number of items to skip.
    pub offset: Option<u32>,
    /// Sort keys; a trailing `-` sorts descending.
    pub sort: Vec<String>,
    /// Resource ids.
    pub ids: Vec<String>,
    /// Resource names.
    pub names: Vec<String>,
    /// References, resolved to `ids` or `names`; they replace both lists.
    pub references: Vec<ResourceRef>,
    /// Only return the aggregate row.
    pub total_only: Option<bool>,
}

impl ListParams {
    /// Creates empty list options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes from a continuation token.
    #[must_use]
    pub fn continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }

    /// Sets the filter expression.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the offset.
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Adds a sort key.
    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        let mut key = field.into();
        if descending {
            key.push('-');
        }
        self.sort.push(key);
        self
    }

    /// Selects resources by id.
    #[must_use]
    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Selects resources by name.
    #[must_use]
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Selects resources by reference.
    #[must_use]
    pub fn references<'a, R, I>(mut self, references: I) -> Self
    where
        R: Reference + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        self.references = references.into_iter().map(ResourceRef::of).collect();
        self
    }

    /// Only return the aggregate row.
    #[must_use]
    pub fn total_only(mut self, total_only: bool) -> Self {
        self.total_only = Some(total_only);
        self
    }

    /// Paging, filtering and sorting parameters only.
    #[must_use]
    pub fn paging_query(&self) -> Params {
        let mut query = Params::new();
        query.insert_opt(CONTINUATION_TOKEN, self.continuation_token.as_deref());
        query.insert_opt("filter", self.filter.as_deref());
        query.insert_opt("limit", self.limit);
        query.insert_opt("offset", self.offset);
        query.insert_list_nonempty("sort", &self.sort);
        query.insert_opt("total_only", self.total_only);
        query
    }

    /// All parameters, with references resolved to `ids` or `names`.
    ///
    /// # Errors
    ///
    /// Fails if the references mix id-only and name-only entries.
    pub fn to_query(&self) -> Result<Params> {
        let mut query = self.paging_query();
        query.insert_list_nonempty("ids", &self.ids);
        query.insert_list_nonempty("names", &self.names);
        process_references(&self.references, &["ids", "names"], &mut query)?;
        Ok(query)
    }
}

/// Space usage of a resource, in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Space {
    /// Reduction ratio of data written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_reduction: Option<f64>,
    /// Physical space used by snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<u64>,
    /// Total physical space used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_physical: Option<u64>,
    /// Physical space unique to the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<u64>,
    /// Logical space written.
    #[serde(default, rename = "virtual", skip_serializing_if = "Option::is_none")]
    pub virtual_space: Option<u64>,
}
