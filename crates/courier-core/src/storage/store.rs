//! Document store abstraction
//!
//! Projects and workspaces are owned by the store; the bootstrap flow only
//! reads and reparents them.

use async_trait::async_trait;

use crate::domain::{Project, Workspace, WorkspaceScope};
use crate::error::Result;

/// Constraint on a record's parent reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParentFilter {
    #[default]
    Any,
    /// Parent equals the given id
    Is(String),
    /// Parent is not one of the given ids. Records without a parent match.
    NotIn(Vec<String>),
    /// Record has no parent
    Unset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub parent: ParentFilter,
    /// Only projects without a remote id
    pub local_only: bool,
}

impl ProjectFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn parent_is(id: impl Into<String>) -> Self {
        Self {
            parent: ParentFilter::Is(id.into()),
            ..Self::default()
        }
    }

    pub fn parent_not_in<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parent: ParentFilter::NotIn(ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn parent_unset() -> Self {
        Self {
            parent: ParentFilter::Unset,
            ..Self::default()
        }
    }

    pub fn local_only(mut self) -> Self {
        self.local_only = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceFilter {
    pub parent: ParentFilter,
    pub scope: Option<WorkspaceScope>,
}

impl WorkspaceFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn parent_is(id: impl Into<String>) -> Self {
        Self {
            parent: ParentFilter::Is(id.into()),
            ..Self::default()
        }
    }

    pub fn scope(mut self, scope: WorkspaceScope) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// Persistence for projects, workspaces and user preferences
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ========== Projects ==========

    async fn find_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>>;

    async fn count_projects(&self, filter: &ProjectFilter) -> Result<u64>;

    async fn get_project(&self, id: &str) -> Result<Option<Project>>;

    /// Insert or replace by id
    async fn upsert_project(&self, project: &Project) -> Result<()>;

    // ========== Workspaces ==========

    async fn find_workspaces(&self, filter: &WorkspaceFilter) -> Result<Vec<Workspace>>;

    async fn count_workspaces(&self, filter: &WorkspaceFilter) -> Result<u64>;

    async fn get_workspace(&self, id: &str) -> Result<Option<Workspace>>;

    /// Insert or replace by id
    async fn upsert_workspace(&self, workspace: &Workspace) -> Result<()>;

    // ========== Preferences ==========

    async fn preference(&self, key: &str) -> Result<Option<String>>;

    async fn set_preference(&self, key: &str, value: &str) -> Result<()>;
}
