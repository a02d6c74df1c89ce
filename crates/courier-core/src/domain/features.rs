//! Per-organization feature flags

use serde::{Deserialize, Serialize};

/// Reason attached to every flag when the backend cannot be asked
pub const UNREACHABLE_REASON: &str = "Courier API unreachable";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureStatus {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FeatureStatus {
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            enabled: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureList {
    pub git_sync: FeatureStatus,
    pub org_basic_rbac: FeatureStatus,
}

impl FeatureList {
    /// All flags off, used for the scratch organization and on any fetch failure
    pub fn unreachable() -> Self {
        Self {
            git_sync: FeatureStatus::disabled(UNREACHABLE_REASON),
            org_basic_rbac: FeatureStatus::disabled(UNREACHABLE_REASON),
        }
    }
}

/// `GET /v1/organizations/{id}/features`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesResponse {
    pub features: FeatureList,
}
