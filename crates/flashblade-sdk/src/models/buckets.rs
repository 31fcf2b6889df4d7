//! Object store bucket models.

use serde::{Deserialize, Serialize};

use super::{Extra, Space};
use crate::reference::ResourceRef;

/// An object store bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Bucket name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Owning object store account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<ResourceRef>,
    /// Creation time, in milliseconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    /// Whether the bucket is pending eradication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destroyed: Option<bool>,
    /// Number of objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_count: Option<u64>,
    /// `none`, `enabled` or `suspended`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versioning: Option<String>,
    /// Space usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<Space>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Extra,
}
