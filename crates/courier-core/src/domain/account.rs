//! Account-level payloads: organization listing, user profile and billing plan

use serde::{Deserialize, Serialize};

use super::null_as_default;
use super::organization::Organization;

/// `GET /v1/organizations`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrganizationsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub limit: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub length: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next: String,
    pub organizations: Vec<Organization>,
}

/// `GET /v1/user/profile`
///
/// Every field tolerates being absent or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub picture: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(deserialize_with = "null_as_default")]
    pub github: String,
    #[serde(deserialize_with = "null_as_default")]
    pub linkedin: String,
    #[serde(deserialize_with = "null_as_default")]
    pub twitter: String,
    #[serde(deserialize_with = "null_as_default")]
    pub given_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub family_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanType {
    #[default]
    Free,
    Individual,
    Team,
    Enterprise,
    EnterpriseMember,
    #[serde(other)]
    Unknown,
}

impl PlanType {
    /// Human-readable plan name; unknown plans display as free
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanType::Free | PlanType::Unknown => "Free",
            PlanType::Individual => "Individual",
            PlanType::Team => "Team",
            PlanType::Enterprise => "Enterprise",
            PlanType::EnterpriseMember => "Enterprise Member",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentSchedule {
    Month,
    Year,
}

/// `GET /v1/billing/current-plan`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPlan {
    pub is_active: bool,
    pub period: PaymentSchedule,
    pub plan_id: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(rename = "type")]
    pub plan_type: PlanType,
}
