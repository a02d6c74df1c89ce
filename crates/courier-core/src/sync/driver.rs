//! File-system storage for version-control blobs
//!
//! Keys are `/`-separated relative paths under `<data_dir>/version-control`.

use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::{Error, Result};

pub const VERSION_CONTROL_DIR: &str = "version-control";

#[derive(Debug, Clone)]
pub struct FileSystemDriver {
    root: PathBuf,
}

impl FileSystemDriver {
    /// Driver rooted at `<data_dir>/version-control`, created if missing
    pub async fn create(data_dir: &Path) -> Result<Self> {
        let root = data_dir.join(VERSION_CONTROL_DIR);
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn get_item(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)?).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write atomically through a sibling temp file
    pub async fn set_item(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(Error::InvalidInput(format!("Invalid storage key: {key}")));
        }
        Ok(self.root.join(relative))
    }
}
