//! Shared organization/user/plan state read by the route layer

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{CurrentPlan, Organization, UserProfile};

/// Result of the most recent successful remote fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationData {
    pub organizations: Vec<Organization>,
    pub user: Option<UserProfile>,
    pub current_plan: Option<CurrentPlan>,
}

impl OrganizationData {
    pub fn organization(&self, organization_id: &str) -> Option<&Organization> {
        self.organizations.iter().find(|o| o.id == organization_id)
    }
}

/// Single-writer cache. Writers replace the whole snapshot, so readers never
/// see organizations from one fetch paired with a user from another.
#[derive(Debug, Default)]
pub struct OrganizationCache {
    inner: RwLock<Arc<OrganizationData>>,
}

impl OrganizationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<OrganizationData> {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, data: OrganizationData) {
        *self.inner.write().await = Arc::new(data);
    }

    pub async fn clear(&self) {
        self.replace(OrganizationData::default()).await;
    }
}
