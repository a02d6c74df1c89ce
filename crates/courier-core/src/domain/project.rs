//! Locally stored projects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::organization::SCRATCHPAD_ORGANIZATION_ID;

/// Identifier of the always-present scratch pad project
pub const SCRATCHPAD_PROJECT_ID: &str = "proj_scratchpad";

/// A project owned by the local document store.
///
/// `parent_id` is the owning organization. Projects created before
/// organizations existed have no parent until they are migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    /// Remote project backing this one; `None` means local-only
    pub remote_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Project {
    /// Create a new local-only project under the given organization
    pub fn new(name: impl Into<String>, organization_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("proj_{}", Uuid::new_v4().simple()),
            name: name.into(),
            parent_id: Some(organization_id.into()),
            remote_id: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Create a project that predates organizations
    pub fn legacy(name: impl Into<String>) -> Self {
        Self {
            parent_id: None,
            ..Self::new(name, "")
        }
    }

    pub fn scratchpad(name: impl Into<String>) -> Self {
        Self {
            id: SCRATCHPAD_PROJECT_ID.to_string(),
            ..Self::new(name, SCRATCHPAD_ORGANIZATION_ID)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_remote_id(mut self, remote_id: impl Into<String>) -> Self {
        self.remote_id = Some(remote_id.into());
        self
    }

    pub fn is_remote(&self) -> bool {
        self.remote_id.is_some()
    }

    pub fn is_scratchpad(&self) -> bool {
        self.id == SCRATCHPAD_PROJECT_ID
    }

    pub fn belongs_to(&self, organization_id: &str) -> bool {
        self.parent_id.as_deref() == Some(organization_id)
    }

    /// Move the project under an organization
    pub fn reparent(&mut self, organization_id: impl Into<String>) {
        self.parent_id = Some(organization_id.into());
        self.modified_at = Utc::now();
    }

    pub fn link_remote(&mut self, remote_id: impl Into<String>) {
        self.remote_id = Some(remote_id.into());
        self.modified_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_is_local() {
        let project = Project::new("API", "org_1");
        assert!(project.id.starts_with("proj_"));
        assert!(!project.is_remote());
        assert!(project.belongs_to("org_1"));
    }

    #[test]
    fn test_legacy_project_has_no_parent() {
        let project = Project::legacy("Old");
        assert_eq!(project.parent_id, None);
        assert!(!project.belongs_to(""));
    }

    #[test]
    fn test_reparent_and_link() {
        let mut project = Project::legacy("Old");
        project.reparent("org_home");
        project.link_remote("rem_1");
        assert!(project.belongs_to("org_home"));
        assert!(project.is_remote());
    }

    #[test]
    fn test_scratchpad_project() {
        let project = Project::scratchpad("Courier");
        assert!(project.is_scratchpad());
        assert!(project.belongs_to(SCRATCHPAD_ORGANIZATION_ID));
    }
}
