//! File system models.

use serde::{Deserialize, Serialize};

use super::{Extra, Space};

/// NFS export settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nfs {
    /// NFSv3 enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v3_enabled: Option<bool>,
    /// NFSv4.1 enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v4_1_enabled: Option<bool>,
    /// Export rules, e.g. `*(rw,no_root_squash)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

/// SMB share settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smb {
    /// SMB enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// A file system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSystem {
    /// File system id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// File system name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Creation time, in milliseconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    /// Whether the file system is pending eradication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destroyed: Option<bool>,
    /// Provisioned size, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned: Option<u64>,
    /// Whether `provisioned` is enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_limit_enabled: Option<bool>,
    /// Whether the file system accepts writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
    /// NFS settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfs: Option<Nfs>,
    /// SMB settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smb: Option<Smb>,
    /// Space usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<Space>,
    /// Milliseconds left before a destroyed file system is eradicated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<u64>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Body of a file system create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemPost {
    /// Provisioned size, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned: Option<u64>,
    /// Whether `provisioned` is enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_limit_enabled: Option<bool>,
    /// NFS settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfs: Option<Nfs>,
    /// SMB settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smb: Option<Smb>,
    /// Whether the file system accepts writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
}

/// Body of a file system update. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemPatch {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Destroy (`true`) or recover (`false`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destroyed: Option<bool>,
    /// Provisioned size, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned: Option<u64>,
    /// Whether `provisioned` is enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_limit_enabled: Option<bool>,
    /// NFS settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfs: Option<Nfs>,
    /// SMB settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smb: Option<Smb>,
    /// Whether the file system accepts writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
}

impl FileSystemPatch {
    /// Marks the file system destroyed.
    #[must_use]
    pub fn destroy() -> Self {
        Self {
            destroyed: Some(true),
            ..Self::default()
        }
    }
}
