//! Route-layer API
//!
//! Async entry points the UI shell (or the CLI) calls to load route data and
//! run actions. Everything is reached through an [`AppContext`], which owns
//! the store, the session, the bootstrapper and its shared cache.

pub mod export;
pub mod organizations;
pub mod projects;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::bootstrap::{Bootstrapper, OrganizationCache};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::remote::HttpApiClient;
use crate::session::{SessionData, SessionProvider, SessionStore};
use crate::storage::{Database, DatabaseConfig, DocumentStore, SqliteDocumentStore, ensure_scratchpad};
use crate::sync::{ConflictInbox, FileSystemSyncFactory, conflict_channel};

/// Name given to the scratch pad project
pub const PRODUCT_NAME: &str = "Courier";

/// Application-wide state passed to every route
pub struct AppContext {
    data_dir: PathBuf,
    session: Arc<SessionStore>,
    bootstrapper: Bootstrapper,
    cancel: CancellationToken,
}

impl AppContext {
    /// Open the local store and wire the real collaborators.
    ///
    /// The returned inbox receives merge conflicts raised by the sync engine;
    /// the caller must answer them or drop the inbox.
    pub async fn open(config: &Config) -> Result<(Self, ConflictInbox)> {
        let data_dir = config
            .storage
            .resolved_data_dir()
            .map_err(|e| Error::ConfigError(format!("{e:#}")))?;

        let db = Database::new(DatabaseConfig::in_data_dir(&data_dir))
            .await
            .map_err(|e| Error::Other(format!("Failed to open local store: {e:#}")))?;
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(db));
        ensure_scratchpad(store.as_ref(), PRODUCT_NAME).await;

        let session = Arc::new(SessionStore::open(&data_dir)?);
        let api = Arc::new(HttpApiClient::from_config(&config.api)?);

        let cancel = CancellationToken::new();
        let (resolver, inbox) = conflict_channel(
            Duration::from_secs(config.sync.conflict_timeout_secs),
            cancel.child_token(),
        );

        let bootstrapper = Bootstrapper::new(
            session.clone(),
            api,
            store.clone(),
            Arc::new(FileSystemSyncFactory::new(&data_dir, store)),
            Arc::new(resolver),
        )
        .with_promotion_concurrency(config.sync.promotion_concurrency);

        info!(data_dir = %data_dir.display(), "Opened application context");
        Ok((
            Self {
                data_dir,
                session,
                bootstrapper,
                cancel,
            },
            inbox,
        ))
    }

    /// Assemble a context from already-built parts
    pub fn from_parts(data_dir: PathBuf, session: Arc<SessionStore>, bootstrapper: Bootstrapper) -> Self {
        Self {
            data_dir,
            session,
            bootstrapper,
            cancel: CancellationToken::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn bootstrapper(&self) -> &Bootstrapper {
        &self.bootstrapper
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.bootstrapper.store().as_ref()
    }

    pub fn cache(&self) -> &Arc<OrganizationCache> {
        self.bootstrapper.cache()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn login(&self, session: SessionData) -> Result<()> {
        self.session.login(session)
    }

    /// End the session and drop cached account data
    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await?;
        self.cache().clear().await;
        Ok(())
    }

    /// Abort any pending conflict prompt
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
