//! Organization routes

use serde::Serialize;
use std::sync::Arc;

use super::AppContext;
use crate::bootstrap::{BootstrapOutcome, OrganizationData};
use crate::domain::FeatureList;
use crate::error::Result;

/// Feature flags for one organization route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationFeatures {
    pub features: FeatureList,
}

/// Organizations index: bootstrap and report where to land
pub async fn index_loader(ctx: &AppContext) -> Result<BootstrapOutcome> {
    ctx.bootstrapper().initialize().await
}

/// Refresh organizations, profile and plan; never fails
pub async fn sync_organizations_action(ctx: &AppContext) {
    ctx.bootstrapper().resync().await;
}

/// Cached organization data, empty when logged out
pub async fn organizations_loader(ctx: &AppContext) -> Arc<OrganizationData> {
    if ctx.is_logged_in() {
        ctx.cache().snapshot().await
    } else {
        Arc::new(OrganizationData::default())
    }
}

pub async fn single_organization_loader(ctx: &AppContext, organization_id: &str) -> OrganizationFeatures {
    OrganizationFeatures {
        features: ctx.bootstrapper().feature_flags(organization_id).await,
    }
}

/// Organization routes reload their data only when the organization changes
pub fn should_revalidate(current_organization_id: Option<&str>, next_organization_id: Option<&str>) -> bool {
    current_organization_id != next_organization_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_revalidate() {
        assert!(should_revalidate(Some("org_a"), Some("org_b")));
        assert!(should_revalidate(None, Some("org_b")));
        assert!(!should_revalidate(Some("org_a"), Some("org_a")));
        assert!(!should_revalidate(None, None));
    }

    #[test]
    fn test_features_shape() {
        let value = serde_json::to_value(OrganizationFeatures {
            features: FeatureList::unreachable(),
        })
        .unwrap();
        assert_eq!(value["features"]["gitSync"]["enabled"], false);
        assert_eq!(value["features"]["orgBasicRbac"]["enabled"], false);
    }
}
