//! API version discovery.

use serde::{Deserialize, Serialize};

/// Reply of `GET /api/api_version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersions {
    /// Supported REST versions, oldest first.
    #[serde(default)]
    pub versions: Vec<String>,
}

impl ApiVersions {
    /// Returns true if the array supports `version`.
    #[must_use]
    pub fn supports(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// The newest version the array supports.
    #[must_use]
    pub fn latest(&self) -> Option<&str> {
        self.versions
            .iter()
            .max_by_key(|v| version_key(v))
            .map(String::as_str)
    }
}

fn version_key(version: &str) -> Vec<u32> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}
