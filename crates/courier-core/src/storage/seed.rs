//! Start-up seeding of singleton records

use tracing::{info, warn};

use super::store::DocumentStore;
use crate::domain::{Project, SCRATCHPAD_PROJECT_ID, SCRATCHPAD_WORKSPACE_ID, Workspace};
use crate::error::Result;

/// Create the scratch pad project and workspace if they are missing.
///
/// Runs once before anything else touches the store so that concurrent
/// initialization cannot create duplicates. Failures are logged, not returned.
pub async fn ensure_scratchpad(store: &dyn DocumentStore, product_name: &str) {
    if let Err(e) = try_ensure_scratchpad(store, product_name).await {
        warn!(error = %e, "Failed to create scratch pad records");
    }
}

async fn try_ensure_scratchpad(store: &dyn DocumentStore, product_name: &str) -> Result<()> {
    if store.get_project(SCRATCHPAD_PROJECT_ID).await?.is_none() {
        info!("Initializing scratch pad project");
        store.upsert_project(&Project::scratchpad(product_name)).await?;
    }

    if store.get_workspace(SCRATCHPAD_WORKSPACE_ID).await?.is_none() {
        info!("Initializing scratch pad workspace");
        store.upsert_workspace(&Workspace::scratchpad()).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SCRATCHPAD_ORGANIZATION_ID;
    use crate::storage::{ProjectFilter, SqliteDocumentStore};

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let store = SqliteDocumentStore::in_memory().await.unwrap();

        ensure_scratchpad(&store, "Courier").await;
        ensure_scratchpad(&store, "Renamed").await;

        let projects = store.find_projects(&ProjectFilter::all()).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Courier");
        assert!(projects[0].belongs_to(SCRATCHPAD_ORGANIZATION_ID));

        let workspace = store.get_workspace(SCRATCHPAD_WORKSPACE_ID).await.unwrap().unwrap();
        assert_eq!(workspace.parent_id, SCRATCHPAD_PROJECT_ID);
    }
}
