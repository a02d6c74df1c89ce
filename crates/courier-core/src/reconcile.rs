//! Untracked-project listing

use serde::Serialize;

use crate::domain::{Project, SCRATCHPAD_ORGANIZATION_ID};
use crate::error::Result;
use crate::storage::{DocumentStore, ProjectFilter, WorkspaceFilter};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UntrackedProject {
    #[serde(flatten)]
    pub project: Project,
    pub workspaces_count: u64,
}

/// Projects whose parent is anything but the scratch organization, with the
/// number of workspaces each one holds.
///
/// Projects without a parent are included. The parent is not checked against
/// the organizations the account can currently see.
pub async fn list_untracked(store: &dyn DocumentStore) -> Result<Vec<UntrackedProject>> {
    let projects = store
        .find_projects(&ProjectFilter::parent_not_in([SCRATCHPAD_ORGANIZATION_ID]))
        .await?;

    let mut untracked = Vec::with_capacity(projects.len());
    for project in projects {
        let workspaces_count = store
            .count_workspaces(&WorkspaceFilter::parent_is(project.id.as_str()))
            .await?;
        untracked.push(UntrackedProject {
            project,
            workspaces_count,
        });
    }
    Ok(untracked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Workspace, WorkspaceScope};
    use crate::storage::SqliteDocumentStore;

    #[tokio::test]
    async fn test_pairs_projects_with_workspace_counts() {
        let store = SqliteDocumentStore::in_memory().await.unwrap();
        let p1 = Project::new("Scratch", SCRATCHPAD_ORGANIZATION_ID).with_id("p1");
        let p2 = Project::new("Api", "org_a").with_id("p2");
        let p3 = Project::new("Empty", "org_b").with_id("p3");
        for p in [&p1, &p2, &p3] {
            store.upsert_project(p).await.unwrap();
        }
        for name in ["one", "two", "three"] {
            store
                .upsert_workspace(&Workspace::new(name, "p2", WorkspaceScope::Collection))
                .await
                .unwrap();
        }

        let mut result = list_untracked(&store).await.unwrap();
        result.sort_by(|a, b| a.project.id.cmp(&b.project.id));

        let summary: Vec<(&str, u64)> = result
            .iter()
            .map(|u| (u.project.id.as_str(), u.workspaces_count))
            .collect();
        assert_eq!(summary, vec![("p2", 3), ("p3", 0)]);
    }

    #[tokio::test]
    async fn test_includes_unparented_projects() {
        let store = SqliteDocumentStore::in_memory().await.unwrap();
        store.upsert_project(&Project::legacy("Old").with_id("old")).await.unwrap();

        let result = list_untracked(&store).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].project.id, "old");
    }

    #[test]
    fn test_serializes_flat() {
        let untracked = UntrackedProject {
            project: Project::new("Api", "org_a").with_id("p2"),
            workspaces_count: 3,
        };
        let value = serde_json::to_value(&untracked).unwrap();
        assert_eq!(value["id"], "p2");
        assert_eq!(value["workspacesCount"], 3);
    }
}
