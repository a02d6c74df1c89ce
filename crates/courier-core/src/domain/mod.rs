//! Domain types shared by the bootstrap flow, the document store and the route layer

pub mod account;
pub mod features;
pub mod organization;
pub mod project;
pub mod workspace;

pub use account::{CurrentPlan, OrganizationsResponse, PaymentSchedule, PlanType, UserProfile};
pub use features::{FeatureList, FeatureStatus};
pub use organization::{
    Branding, Organization, OrganizationMetadata, OrganizationType, SCRATCHPAD_ORGANIZATION_ID,
    is_scratchpad_organization_id,
};
pub use project::{Project, SCRATCHPAD_PROJECT_ID};
pub use workspace::{SCRATCHPAD_WORKSPACE_ID, Workspace, WorkspaceScope};

use serde::{Deserialize, Deserializer};

/// Decode an explicit `null` the same way as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
