//! Sync engine: legacy-project migration, remote tracking and conflict hand-off
//!
//! A project is tracked against one remote project. Linking it to a different
//! remote raises a [`MergeConflict`] between the stored record ("mine") and the
//! new one ("theirs").

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::conflict::{ConflictResolver, MergeConflict};
use super::driver::FileSystemDriver;
use crate::domain::{Organization, Project};
use crate::error::{Error, Result};
use crate::storage::{DocumentStore, ProjectFilter};

#[async_trait]
pub trait SyncEngine: Send + Sync {
    /// True when local projects exist that no organization owns yet
    async fn should_migrate(&self) -> Result<bool>;

    /// Move every unowned project into `organization`, returning the moved ids
    async fn migrate_local_projects_into_organization(
        &self,
        organization: &Organization,
    ) -> Result<Vec<String>>;

    /// Record that a local project is now backed by a remote project.
    ///
    /// Returns the remote id that ends up tracked, `None` for a project
    /// without a remote. When the project is already tracked against another
    /// remote the two records are handed to the conflict resolver.
    async fn track_remote_project(&self, project: &Project) -> Result<Option<String>>;
}

#[async_trait]
pub trait SyncEngineFactory: Send + Sync {
    async fn create(&self, resolver: Arc<dyn ConflictResolver>) -> Result<Arc<dyn SyncEngine>>;
}

/// Per-project tracking record kept in version-control storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProjectMeta {
    pub project_id: String,
    pub remote_id: String,
    pub organization_id: String,
    pub name: String,
    pub tracked_at: DateTime<Utc>,
}

fn meta_key(project_id: &str) -> String {
    format!("projects/{}/meta.json", project_id)
}

/// Sync engine over the local document store and file-system blob storage
pub struct LocalSyncEngine {
    store: Arc<dyn DocumentStore>,
    driver: FileSystemDriver,
    resolver: Arc<dyn ConflictResolver>,
}

impl LocalSyncEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        driver: FileSystemDriver,
        resolver: Arc<dyn ConflictResolver>,
    ) -> Self {
        Self {
            store,
            driver,
            resolver,
        }
    }

    pub async fn remote_meta(&self, project_id: &str) -> Result<Option<RemoteProjectMeta>> {
        match self.driver.get_item(&meta_key(project_id)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Ask the resolver which tracking record wins
    async fn settle(
        &self,
        mine: RemoteProjectMeta,
        theirs: RemoteProjectMeta,
    ) -> Result<RemoteProjectMeta> {
        let mine_blob = serde_json::to_string(&mine)?;
        let theirs_blob = serde_json::to_string(&theirs)?;
        let conflict = MergeConflict {
            key: meta_key(&mine.project_id),
            name: theirs.name.clone(),
            message: format!(
                "Tracked as remote project {} but now linked to {}",
                mine.remote_id, theirs.remote_id
            ),
            mine_blob: Some(mine_blob.clone()),
            theirs_blob: Some(theirs_blob.clone()),
            choose: None,
        };

        let resolved = self.resolver.resolve(vec![conflict]).await?;
        match resolved.into_iter().next().and_then(|c| c.choose) {
            Some(choice) if choice == theirs_blob => Ok(theirs),
            Some(choice) if choice == mine_blob => {
                warn!(
                    project_id = %mine.project_id,
                    orphaned = %theirs.remote_id,
                    "Kept existing remote link"
                );
                Ok(mine)
            }
            _ => Err(Error::ConflictUnresolved(mine.project_id)),
        }
    }

    async fn legacy_projects(&self) -> Result<Vec<Project>> {
        let projects = self.store.find_projects(&ProjectFilter::parent_unset()).await?;
        Ok(projects.into_iter().filter(|p| !p.is_scratchpad()).collect())
    }
}

#[async_trait]
impl SyncEngine for LocalSyncEngine {
    async fn should_migrate(&self) -> Result<bool> {
        Ok(!self.legacy_projects().await?.is_empty())
    }

    async fn migrate_local_projects_into_organization(
        &self,
        organization: &Organization,
    ) -> Result<Vec<String>> {
        let mut migrated = Vec::new();
        for mut project in self.legacy_projects().await? {
            project.reparent(organization.id.as_str());
            self.store.upsert_project(&project).await?;
            debug!(project_id = %project.id, "Migrated project");
            migrated.push(project.id);
        }

        info!(
            organization_id = %organization.id,
            count = migrated.len(),
            "Migrated local projects into organization"
        );
        Ok(migrated)
    }

    async fn track_remote_project(&self, project: &Project) -> Result<Option<String>> {
        let (Some(remote_id), Some(organization_id)) = (&project.remote_id, &project.parent_id)
        else {
            return Ok(None);
        };
        let incoming = RemoteProjectMeta {
            project_id: project.id.clone(),
            remote_id: remote_id.clone(),
            organization_id: organization_id.clone(),
            name: project.name.clone(),
            tracked_at: Utc::now(),
        };

        let tracked = match self.remote_meta(&project.id).await? {
            Some(existing) if existing.remote_id != incoming.remote_id => {
                self.settle(existing, incoming).await?
            }
            _ => incoming,
        };
        self.driver
            .set_item(&meta_key(&project.id), &serde_json::to_vec_pretty(&tracked)?)
            .await?;
        Ok(Some(tracked.remote_id))
    }
}

/// Creates [`LocalSyncEngine`]s storing blobs under the data directory
pub struct FileSystemSyncFactory {
    data_dir: PathBuf,
    store: Arc<dyn DocumentStore>,
}

impl FileSystemSyncFactory {
    pub fn new(data_dir: impl Into<PathBuf>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            data_dir: data_dir.into(),
            store,
        }
    }
}

#[async_trait]
impl SyncEngineFactory for FileSystemSyncFactory {
    async fn create(&self, resolver: Arc<dyn ConflictResolver>) -> Result<Arc<dyn SyncEngine>> {
        let driver = FileSystemDriver::create(&self.data_dir).await?;
        info!(root = %driver.root().display(), "Initialized sync engine");
        Ok(Arc::new(LocalSyncEngine::new(
            self.store.clone(),
            driver,
            resolver,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrganizationMetadata, OrganizationType, SCRATCHPAD_ORGANIZATION_ID};
    use crate::storage::{SqliteDocumentStore, ensure_scratchpad};
    use crate::sync::conflict::ConflictPolicy;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Answers with a fixed policy, or dismisses the prompt with `None`
    #[derive(Default)]
    struct Scripted {
        policy: Option<ConflictPolicy>,
        asked: Mutex<Vec<MergeConflict>>,
    }

    impl Scripted {
        fn answering(policy: ConflictPolicy) -> Self {
            Self {
                policy: Some(policy),
                asked: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl ConflictResolver for Scripted {
        async fn resolve(&self, conflicts: Vec<MergeConflict>) -> Result<Vec<MergeConflict>> {
            self.asked.lock().unwrap().extend(conflicts.iter().cloned());
            Ok(match self.policy {
                Some(policy) => policy.apply(conflicts),
                None => Vec::new(),
            })
        }
    }

    fn personal_org() -> Organization {
        Organization {
            id: "org_home".to_string(),
            name: "Personal".to_string(),
            display_name: "Personal".to_string(),
            branding: None,
            metadata: OrganizationMetadata {
                organization_type: OrganizationType::Personal,
                owner_account_id: "acct_1".to_string(),
            },
        }
    }

    async fn engine_with(
        temp: &TempDir,
        resolver: Arc<dyn ConflictResolver>,
    ) -> (Arc<SqliteDocumentStore>, LocalSyncEngine) {
        let store = Arc::new(SqliteDocumentStore::in_memory().await.unwrap());
        ensure_scratchpad(store.as_ref(), "Courier").await;
        let driver = FileSystemDriver::create(temp.path()).await.unwrap();
        let engine = LocalSyncEngine::new(store.clone(), driver, resolver);
        (store, engine)
    }

    async fn engine(temp: &TempDir) -> (Arc<SqliteDocumentStore>, LocalSyncEngine) {
        engine_with(temp, Arc::new(Scripted::answering(ConflictPolicy::Theirs))).await
    }

    #[tokio::test]
    async fn test_migrates_only_unowned_projects() {
        let temp = TempDir::new().unwrap();
        let (store, engine) = engine(&temp).await;
        let legacy = Project::legacy("Old");
        let scoped = Project::new("Team work", "org_team");
        store.upsert_project(&legacy).await.unwrap();
        store.upsert_project(&scoped).await.unwrap();

        assert!(engine.should_migrate().await.unwrap());
        let migrated = engine
            .migrate_local_projects_into_organization(&personal_org())
            .await
            .unwrap();

        assert_eq!(migrated, vec![legacy.id.clone()]);
        let moved = store.get_project(&legacy.id).await.unwrap().unwrap();
        assert!(moved.belongs_to("org_home"));
        let untouched = store.get_project(&scoped.id).await.unwrap().unwrap();
        assert!(untouched.belongs_to("org_team"));
        let scratch = store.get_project(crate::domain::SCRATCHPAD_PROJECT_ID).await.unwrap().unwrap();
        assert!(scratch.belongs_to(SCRATCHPAD_ORGANIZATION_ID));
        assert!(!engine.should_migrate().await.unwrap());
    }

    #[tokio::test]
    async fn test_track_remote_project_writes_meta() {
        let temp = TempDir::new().unwrap();
        let (_store, engine) = engine(&temp).await;
        let project = Project::new("Billing", "org_home").with_remote_id("rem_1");

        let tracked = engine.track_remote_project(&project).await.unwrap();

        assert_eq!(tracked.as_deref(), Some("rem_1"));
        let meta = engine.remote_meta(&project.id).await.unwrap().unwrap();
        assert_eq!(meta.remote_id, "rem_1");
        assert_eq!(meta.organization_id, "org_home");
    }

    #[tokio::test]
    async fn test_local_project_is_not_tracked() {
        let temp = TempDir::new().unwrap();
        let (_store, engine) = engine(&temp).await;
        let project = Project::new("Local", "org_home");

        assert_eq!(engine.track_remote_project(&project).await.unwrap(), None);
        assert!(engine.remote_meta(&project.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_remote_is_retracked_without_prompt() {
        let temp = TempDir::new().unwrap();
        let resolver = Arc::new(Scripted::default());
        let (_store, engine) = engine_with(&temp, resolver.clone()).await;
        let project = Project::new("Billing", "org_home").with_remote_id("rem_1");

        engine.track_remote_project(&project).await.unwrap();
        engine.track_remote_project(&project).await.unwrap();

        assert!(resolver.asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relinked_project_goes_through_resolver() {
        let temp = TempDir::new().unwrap();
        let resolver = Arc::new(Scripted::answering(ConflictPolicy::Theirs));
        let (_store, engine) = engine_with(&temp, resolver.clone()).await;
        let project = Project::new("Billing", "org_home").with_id("proj_1").with_remote_id("rem_old");
        engine.track_remote_project(&project).await.unwrap();

        let relinked = project.clone().with_remote_id("rem_new");
        let tracked = engine.track_remote_project(&relinked).await.unwrap();

        assert_eq!(tracked.as_deref(), Some("rem_new"));
        let asked = resolver.asked.lock().unwrap();
        assert_eq!(asked.len(), 1);
        assert_eq!(asked[0].key, "projects/proj_1/meta.json");
        assert!(asked[0].mine_blob.as_deref().unwrap().contains("rem_old"));
        assert!(asked[0].theirs_blob.as_deref().unwrap().contains("rem_new"));
        let meta = engine.remote_meta("proj_1").await.unwrap().unwrap();
        assert_eq!(meta.remote_id, "rem_new");
    }

    #[tokio::test]
    async fn test_choosing_mine_keeps_existing_link() {
        let temp = TempDir::new().unwrap();
        let resolver = Arc::new(Scripted::answering(ConflictPolicy::Ours));
        let (_store, engine) = engine_with(&temp, resolver).await;
        let project = Project::new("Billing", "org_home").with_id("proj_1").with_remote_id("rem_old");
        engine.track_remote_project(&project).await.unwrap();

        let tracked = engine
            .track_remote_project(&project.clone().with_remote_id("rem_new"))
            .await
            .unwrap();

        assert_eq!(tracked.as_deref(), Some("rem_old"));
        let meta = engine.remote_meta("proj_1").await.unwrap().unwrap();
        assert_eq!(meta.remote_id, "rem_old");
    }

    #[tokio::test]
    async fn test_dismissed_prompt_leaves_conflict_unresolved() {
        let temp = TempDir::new().unwrap();
        let (_store, engine) = engine_with(&temp, Arc::new(Scripted::default())).await;
        let project = Project::new("Billing", "org_home").with_id("proj_1").with_remote_id("rem_old");
        engine.track_remote_project(&project).await.unwrap();

        let err = engine
            .track_remote_project(&project.clone().with_remote_id("rem_new"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ConflictUnresolved(ref id) if id == "proj_1"));
        let meta = engine.remote_meta("proj_1").await.unwrap().unwrap();
        assert_eq!(meta.remote_id, "rem_old");
    }

    #[tokio::test]
    async fn test_factory_creates_storage_root() {
        let temp = TempDir::new().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::in_memory().await.unwrap());
        let factory = FileSystemSyncFactory::new(temp.path(), store);

        factory.create(Arc::new(Scripted::default())).await.unwrap();
        assert!(temp.path().join(crate::sync::driver::VERSION_CONTROL_DIR).is_dir());
    }
}
