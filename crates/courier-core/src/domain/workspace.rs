//! Workspaces (request collections and API designs) inside a project

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::SCRATCHPAD_PROJECT_ID;

/// Identifier of the always-present scratch pad workspace
pub const SCRATCHPAD_WORKSPACE_ID: &str = "wrk_scratchpad";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceScope {
    #[default]
    Collection,
    Design,
}

impl WorkspaceScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceScope::Collection => "collection",
            WorkspaceScope::Design => "design",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "collection" => Some(WorkspaceScope::Collection),
            "design" => Some(WorkspaceScope::Design),
            _ => None,
        }
    }

    /// Singular label shown in the UI
    pub fn label(&self) -> &'static str {
        match self {
            WorkspaceScope::Collection => "Collection",
            WorkspaceScope::Design => "Document",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    /// Owning project
    pub parent_id: String,
    pub scope: WorkspaceScope,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(name: impl Into<String>, project_id: impl Into<String>, scope: WorkspaceScope) -> Self {
        let now = Utc::now();
        Self {
            id: format!("wrk_{}", Uuid::new_v4().simple()),
            name: name.into(),
            parent_id: project_id.into(),
            scope,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn scratchpad() -> Self {
        Self {
            id: SCRATCHPAD_WORKSPACE_ID.to_string(),
            ..Self::new("Scratch Pad", SCRATCHPAD_PROJECT_ID, WorkspaceScope::Collection)
        }
    }

    pub fn is_design(&self) -> bool {
        self.scope == WorkspaceScope::Design
    }

    pub fn is_scratchpad(&self) -> bool {
        self.id == SCRATCHPAD_WORKSPACE_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parse() {
        assert_eq!(WorkspaceScope::parse("design"), Some(WorkspaceScope::Design));
        assert_eq!(WorkspaceScope::parse("collection"), Some(WorkspaceScope::Collection));
        assert_eq!(WorkspaceScope::parse("openapi"), None);
        assert_eq!(WorkspaceScope::Design.label(), "Document");
    }

    #[test]
    fn test_scratchpad_workspace() {
        let workspace = Workspace::scratchpad();
        assert!(workspace.is_scratchpad());
        assert!(!workspace.is_design());
        assert_eq!(workspace.parent_id, SCRATCHPAD_PROJECT_ID);
    }
}
