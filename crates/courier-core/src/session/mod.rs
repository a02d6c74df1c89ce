//! Login state
//!
//! [`SessionProvider`] is what the bootstrap flow reads. [`SessionStore`] is
//! the implementation used by the application: it keeps the session in memory
//! and, unless ephemeral, mirrors it to `session.json` in the data directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::Result;

pub const SESSION_FILE: &str = "session.json";

#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn current_session_id(&self) -> Option<String>;

    fn current_account_id(&self) -> Option<String>;

    fn is_logged_in(&self) -> bool {
        self.current_session_id().is_some()
    }

    /// End the session. Calling this while logged out is a no-op.
    async fn logout(&self) -> Result<()>;
}

/// A logged-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub id: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            email: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    current: RwLock<Option<SessionData>>,
}

impl SessionStore {
    /// Session kept only for the lifetime of the process
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            current: RwLock::new(None),
        }
    }

    /// Session persisted in `data_dir`, restoring a previous login if present.
    ///
    /// An unreadable session file is treated as logged out.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(SESSION_FILE);
        let current = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str::<SessionData>(&contents) {
                Ok(session) => {
                    debug!(account_id = %session.account_id, "Restored session");
                    Some(session)
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring corrupt session file");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            path: Some(path),
            current: RwLock::new(current),
        })
    }

    pub fn login(&self, session: SessionData) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_string_pretty(&session)?)?;
        }
        info!(account_id = %session.account_id, "Logged in");
        *self.write_guard() = Some(session);
        Ok(())
    }

    pub fn current(&self) -> Option<SessionData> {
        self.read_guard().clone()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, Option<SessionData>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<SessionData>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionProvider for SessionStore {
    fn current_session_id(&self) -> Option<String> {
        self.read_guard().as_ref().map(|s| s.id.clone())
    }

    fn current_account_id(&self) -> Option<String> {
        self.read_guard().as_ref().map(|s| s.account_id.clone())
    }

    async fn logout(&self) -> Result<()> {
        let previous = self.write_guard().take();
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if previous.is_some() {
            info!("Logged out");
        }
        Ok(())
    }
}
