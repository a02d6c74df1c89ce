//! Organizations as returned by the remote API

use serde::{Deserialize, Serialize};

/// Identifier of the non-persisted organization that owns the scratch pad
pub const SCRATCHPAD_ORGANIZATION_ID: &str = "org_scratchpad";

pub fn is_scratchpad_organization_id(organization_id: &str) -> bool {
    organization_id == SCRATCHPAD_ORGANIZATION_ID
}

/// Organization classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrganizationType {
    Personal,
    Team,
    Enterprise,
    EnterpriseMember,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Branding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMetadata {
    pub organization_type: OrganizationType,
    pub owner_account_id: String,
}

/// An organization the current account belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,
    pub metadata: OrganizationMetadata,
}

impl Organization {
    pub fn is_personal(&self) -> bool {
        self.metadata.organization_type == OrganizationType::Personal
    }

    pub fn is_owned_by(&self, account_id: &str) -> bool {
        self.metadata.owner_account_id == account_id
    }

    /// The account's own personal organization
    pub fn is_home_of(&self, account_id: &str) -> bool {
        self.is_personal() && self.is_owned_by(account_id)
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.branding.as_ref().and_then(|b| b.logo_url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_wire_format() {
        let org: Organization = serde_json::from_value(serde_json::json!({
            "id": "org_1",
            "name": "acme",
            "display_name": "Acme Inc",
            "branding": { "logo_url": "https://cdn/logo.png" },
            "metadata": { "organizationType": "enterprise-member", "ownerAccountId": "acct_9" }
        }))
        .unwrap();

        assert_eq!(org.metadata.organization_type, OrganizationType::EnterpriseMember);
        assert_eq!(org.logo_url(), Some("https://cdn/logo.png"));
        assert!(org.is_owned_by("acct_9"));
        assert!(!org.is_personal());
    }

    #[test]
    fn test_unknown_type_does_not_fail() {
        let org: Organization = serde_json::from_value(serde_json::json!({
            "id": "org_2",
            "name": "x",
            "metadata": { "organizationType": "galactic", "ownerAccountId": "a" }
        }))
        .unwrap();
        assert_eq!(org.metadata.organization_type, OrganizationType::Unknown);
        assert_eq!(org.logo_url(), None);
    }

    #[test]
    fn test_null_display_name_is_empty() {
        let org: Organization = serde_json::from_value(serde_json::json!({
            "id": "org_3",
            "name": "y",
            "display_name": null,
            "branding": null,
            "metadata": { "organizationType": "team", "ownerAccountId": "a" }
        }))
        .unwrap();
        assert!(org.display_name.is_empty());
        assert!(org.branding.is_none());
    }

    #[test]
    fn test_scratchpad_id() {
        assert!(is_scratchpad_organization_id(SCRATCHPAD_ORGANIZATION_ID));
        assert!(!is_scratchpad_organization_id("org_real"));
    }
}
