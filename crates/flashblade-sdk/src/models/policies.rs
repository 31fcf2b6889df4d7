//! Snapshot policy models.

use serde::{Deserialize, Serialize};

use super::Extra;
use crate::reference::ResourceRef;

/// A snapshot scheduling policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Policy name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the policy is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Whether the policy is defined on this array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_local: Option<bool>,
    /// Array the policy is defined on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ResourceRef>,
    /// Scheduling rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<PolicyRule>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// One snapshot schedule of a policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Snapshot interval, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every: Option<u64>,
    /// Snapshot retention, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_for: Option<u64>,
    /// Time of day for daily snapshots, in milliseconds after midnight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<u64>,
    /// Time zone of `at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// A policy attached to a member resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMember {
    /// The member, e.g. a file system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<ResourceRef>,
    /// The policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<ResourceRef>,
}
