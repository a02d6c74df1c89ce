//! Export and import of all local data
//!
//! The export flow asks a [`DirectoryPicker`] for a destination, writes the
//! data there and reports the result through a [`Notifier`]. Exactly one of
//! the "complete" and "failed" notices is shown per export.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::Result;
use crate::storage::{DocumentStore, ExportScope, ExportSummary, ImportSummary, export_data, import_data};

pub const EXPORT_COMPLETE_TITLE: &str = "Export Complete";
pub const EXPORT_FAILED_TITLE: &str = "Export Failed";

#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// `None` when the user cancels
    async fn pick_directory(&self, title: &str) -> Option<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: Notice);
}

#[derive(Debug)]
pub enum ExportFlowOutcome {
    Cancelled,
    Exported(ExportSummary),
    Failed(String),
}

/// Ask for a directory and export into it
pub async fn export_all_data_flow(
    store: &dyn DocumentStore,
    picker: &dyn DirectoryPicker,
    notifier: &dyn Notifier,
    scope: &ExportScope,
) -> ExportFlowOutcome {
    let Some(directory) = picker.pick_directory("Export All Courier Data").await else {
        info!("Export cancelled");
        return ExportFlowOutcome::Cancelled;
    };

    match export_data(store, &directory, scope).await {
        Ok(summary) => {
            notifier
                .notify(Notice {
                    kind: NoticeKind::Success,
                    title: EXPORT_COMPLETE_TITLE.to_string(),
                    message: format!(
                        "All your data have been successfully exported ({} workspaces)",
                        summary.workspace_count()
                    ),
                })
                .await;
            ExportFlowOutcome::Exported(summary)
        }
        Err(e) => {
            error!(directory = %directory.display(), error = %e, "Export failed");
            notifier
                .notify(Notice {
                    kind: NoticeKind::Failure,
                    title: EXPORT_FAILED_TITLE.to_string(),
                    message: "An error occurred while exporting data. Please try again.".to_string(),
                })
                .await;
            ExportFlowOutcome::Failed(e.to_string())
        }
    }
}

pub async fn import_all_data(store: &dyn DocumentStore, directory: &Path) -> Result<ImportSummary> {
    let summary = import_data(store, directory).await?;
    info!(
        directory = %directory.display(),
        records = summary.total_records,
        warnings = summary.warnings.len(),
        "Imported data"
    );
    Ok(summary)
}
