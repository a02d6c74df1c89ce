//! SQLite-backed document store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::database::Database;
use super::store::{DocumentStore, ParentFilter, ProjectFilter, WorkspaceFilter};
use crate::domain::{Project, Workspace, WorkspaceScope};
use crate::error::{Error, Result};

const SELECT_PROJECTS: &str = "SELECT id, name, parent_id, remote_id, created_at, modified_at FROM projects WHERE 1 = 1";
const COUNT_PROJECTS: &str = "SELECT COUNT(*) FROM projects WHERE 1 = 1";
const SELECT_WORKSPACES: &str = "SELECT id, name, parent_id, scope, created_at, modified_at FROM workspaces WHERE 1 = 1";
const COUNT_WORKSPACES: &str = "SELECT COUNT(*) FROM workspaces WHERE 1 = 1";

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    parent_id: Option<String>,
    remote_id: Option<String>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            parent_id: row.parent_id,
            remote_id: row.remote_id,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct WorkspaceRow {
    id: String,
    name: String,
    parent_id: String,
    scope: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl TryFrom<WorkspaceRow> for Workspace {
    type Error = Error;

    fn try_from(row: WorkspaceRow) -> Result<Self> {
        let scope = WorkspaceScope::parse(&row.scope).ok_or_else(|| {
            Error::Parse(format!("Unknown scope '{}' on workspace {}", row.scope, row.id))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            parent_id: row.parent_id,
            scope,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

fn push_parent_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, parent: &'a ParentFilter) {
    match parent {
        ParentFilter::Any => {}
        ParentFilter::Is(id) => {
            qb.push(" AND parent_id = ").push_bind(id.as_str());
        }
        ParentFilter::Unset => {
            qb.push(" AND parent_id IS NULL");
        }
        ParentFilter::NotIn(ids) if ids.is_empty() => {}
        ParentFilter::NotIn(ids) => {
            // SQL `NOT IN` never matches NULL, document stores do
            qb.push(" AND (parent_id IS NULL OR parent_id NOT IN (");
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(id.as_str());
            }
            separated.push_unseparated("))");
        }
    }
}

fn project_query<'a>(base: &str, filter: &'a ProjectFilter) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::new(base);
    push_parent_filter(&mut qb, &filter.parent);
    if filter.local_only {
        qb.push(" AND remote_id IS NULL");
    }
    qb
}

fn workspace_query<'a>(base: &str, filter: &'a WorkspaceFilter) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::new(base);
    push_parent_filter(&mut qb, &filter.parent);
    if let Some(scope) = filter.scope {
        qb.push(" AND scope = ").push_bind(scope.as_str());
    }
    qb
}

/// Document store on the local SQLite database
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    db: Database,
}

impl SqliteDocumentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Fresh in-memory store with the schema applied
    pub async fn in_memory() -> Result<Self> {
        let db = Database::in_memory()
            .await
            .map_err(|e| Error::Other(format!("Failed to open in-memory store: {e:#}")))?;
        Ok(Self::new(db))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn find_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>> {
        let mut qb = project_query(SELECT_PROJECTS, filter);
        qb.push(" ORDER BY created_at, id");
        let rows: Vec<ProjectRow> = qb.build_query_as().fetch_all(self.db.pool()).await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn count_projects(&self, filter: &ProjectFilter) -> Result<u64> {
        let mut qb = project_query(COUNT_PROJECTS, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(self.db.pool()).await?;
        Ok(count as u64)
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as(
            "SELECT id, name, parent_id, remote_id, created_at, modified_at FROM projects WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.map(Project::from))
    }

    async fn upsert_project(&self, project: &Project) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, name, parent_id, remote_id, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                parent_id = excluded.parent_id,
                remote_id = excluded.remote_id,
                modified_at = excluded.modified_at
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.parent_id)
        .bind(&project.remote_id)
        .bind(project.created_at)
        .bind(project.modified_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn find_workspaces(&self, filter: &WorkspaceFilter) -> Result<Vec<Workspace>> {
        let mut qb = workspace_query(SELECT_WORKSPACES, filter);
        qb.push(" ORDER BY created_at, id");
        let rows: Vec<WorkspaceRow> = qb.build_query_as().fetch_all(self.db.pool()).await?;
        rows.into_iter().map(Workspace::try_from).collect()
    }

    async fn count_workspaces(&self, filter: &WorkspaceFilter) -> Result<u64> {
        let mut qb = workspace_query(COUNT_WORKSPACES, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(self.db.pool()).await?;
        Ok(count as u64)
    }

    async fn get_workspace(&self, id: &str) -> Result<Option<Workspace>> {
        let row: Option<WorkspaceRow> = sqlx::query_as(
            "SELECT id, name, parent_id, scope, created_at, modified_at FROM workspaces WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        row.map(Workspace::try_from).transpose()
    }

    async fn upsert_workspace(&self, workspace: &Workspace) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workspaces (id, name, parent_id, scope, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                parent_id = excluded.parent_id,
                scope = excluded.scope,
                modified_at = excluded.modified_at
            "#,
        )
        .bind(&workspace.id)
        .bind(&workspace.name)
        .bind(&workspace.parent_id)
        .bind(workspace.scope.as_str())
        .bind(workspace.created_at)
        .bind(workspace.modified_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn preference(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO preferences (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SCRATCHPAD_ORGANIZATION_ID;

    async fn store() -> SqliteDocumentStore {
        SqliteDocumentStore::in_memory()
            .await
            .expect("Failed to create store")
    }

    #[tokio::test]
    async fn test_upsert_and_get_project() {
        let store = store().await;
        let mut project = Project::new("Payments API", "org_a");
        store.upsert_project(&project).await.unwrap();

        project.link_remote("rem_1");
        store.upsert_project(&project).await.unwrap();

        let loaded = store.get_project(&project.id).await.unwrap().unwrap();
        assert_eq!(loaded.remote_id.as_deref(), Some("rem_1"));
        assert_eq!(store.count_projects(&ProjectFilter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_not_in_filter_keeps_unparented_projects() {
        let store = store().await;
        store
            .upsert_project(&Project::new("Scratch", SCRATCHPAD_ORGANIZATION_ID))
            .await
            .unwrap();
        store.upsert_project(&Project::new("Team", "org_a")).await.unwrap();
        store.upsert_project(&Project::legacy("Legacy")).await.unwrap();

        let found = store
            .find_projects(&ProjectFilter::parent_not_in([SCRATCHPAD_ORGANIZATION_ID]))
            .await
            .unwrap();
        let mut names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Legacy", "Team"]);
    }

    #[tokio::test]
    async fn test_parent_is_and_local_only() {
        let store = store().await;
        store.upsert_project(&Project::new("Local", "org_home")).await.unwrap();
        store
            .upsert_project(&Project::new("Remote", "org_home").with_remote_id("rem_2"))
            .await
            .unwrap();
        store.upsert_project(&Project::new("Elsewhere", "org_b")).await.unwrap();

        let local = store
            .find_projects(&ProjectFilter::parent_is("org_home").local_only())
            .await
            .unwrap();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].name, "Local");

        assert_eq!(
            store.count_projects(&ProjectFilter::parent_unset()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_workspace_count_by_parent_and_scope() {
        let store = store().await;
        for scope in [WorkspaceScope::Collection, WorkspaceScope::Design, WorkspaceScope::Design] {
            store
                .upsert_workspace(&Workspace::new("w", "proj_1", scope))
                .await
                .unwrap();
        }
        store
            .upsert_workspace(&Workspace::new("other", "proj_2", WorkspaceScope::Collection))
            .await
            .unwrap();

        assert_eq!(
            store.count_workspaces(&WorkspaceFilter::parent_is("proj_1")).await.unwrap(),
            3
        );
        assert_eq!(
            store
                .count_workspaces(&WorkspaceFilter::parent_is("proj_1").scope(WorkspaceScope::Design))
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            store.find_workspaces(&WorkspaceFilter::all()).await.unwrap().len(),
            4
        );
    }

    #[tokio::test]
    async fn test_preferences() {
        let store = store().await;
        assert_eq!(store.preference("prefers-project-type").await.unwrap(), None);

        store.set_preference("prefers-project-type", "local").await.unwrap();
        store.set_preference("prefers-project-type", "remote").await.unwrap();
        assert_eq!(
            store.preference("prefers-project-type").await.unwrap().as_deref(),
            Some("remote")
        );
    }
}
