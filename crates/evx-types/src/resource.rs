//! Organization-level resources listed by the API.

use serde::{Deserialize, Serialize};

use crate::de::null_as_default;

/// A source code repository linked to an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<RepositoryProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryProvider {
    pub id: String,
    pub name: String,
}

/// A deployed version of one or more projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_released: Option<String>,
    /// Issues first seen in this release.
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_groups: u64,
}

impl Release {
    /// Short form of the version for list output.
    pub fn display_version(&self) -> &str {
        self.short_version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.version)
    }
}
