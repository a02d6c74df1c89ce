//! JSONL export and import of local data
//!
//! An export directory holds one record per line, sorted by id so that
//! repeated exports diff cleanly:
//!
//! ```text
//! <dir>/
//! ├── projects.jsonl
//! ├── workspaces.jsonl
//! └── _metadata.json
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::migrations::CURRENT_VERSION;
use super::store::{DocumentStore, ProjectFilter, WorkspaceFilter};
use crate::domain::{Project, Workspace};
use crate::error::{Error, Result};

pub const PROJECTS_FILE: &str = "projects.jsonl";
pub const WORKSPACES_FILE: &str = "workspaces.jsonl";
pub const METADATA_FILE: &str = "_metadata.json";

/// What to export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportScope {
    All,
    /// A single project and its workspaces
    Project(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub exported_at: DateTime<Utc>,
    pub schema_version: i32,
    pub record_counts: BTreeMap<String, usize>,
    pub total_records: usize,
}

/// Result of an export operation
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub directory: PathBuf,
    pub metadata: ExportMetadata,
    pub files_written: Vec<PathBuf>,
}

impl ExportSummary {
    pub fn workspace_count(&self) -> usize {
        self.metadata
            .record_counts
            .get("workspaces")
            .copied()
            .unwrap_or(0)
    }
}

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub record_counts: BTreeMap<String, usize>,
    pub total_records: usize,
    pub warnings: Vec<String>,
}

/// Export local data into `directory`
pub async fn export_data(
    store: &dyn DocumentStore,
    directory: &Path,
    scope: &ExportScope,
) -> Result<ExportSummary> {
    let (mut projects, mut workspaces) = match scope {
        ExportScope::All => (
            store.find_projects(&ProjectFilter::all()).await?,
            store.find_workspaces(&WorkspaceFilter::all()).await?,
        ),
        ExportScope::Project(id) => {
            let project = store
                .get_project(id)
                .await?
                .ok_or_else(|| Error::ProjectNotFound(id.clone()))?;
            let workspaces = store.find_workspaces(&WorkspaceFilter::parent_is(id.as_str())).await?;
            (vec![project], workspaces)
        }
    };
    projects.sort_by(|a, b| a.id.cmp(&b.id));
    workspaces.sort_by(|a, b| a.id.cmp(&b.id));

    let target = directory.to_path_buf();
    let summary = blocking(move || write_export(&target, &projects, &workspaces)).await?;

    info!(
        directory = %directory.display(),
        records = summary.metadata.total_records,
        workspaces = summary.workspace_count(),
        "Exported local data"
    );
    Ok(summary)
}

/// Run file I/O off the async runtime
async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::Other(format!("File task failed: {e}")))?
}

fn write_export(
    directory: &Path,
    projects: &[Project],
    workspaces: &[Workspace],
) -> Result<ExportSummary> {
    fs::create_dir_all(directory)?;

    let projects_path = directory.join(PROJECTS_FILE);
    let workspaces_path = directory.join(WORKSPACES_FILE);
    let project_count = write_jsonl(&projects_path, projects)?;
    let workspace_count = write_jsonl(&workspaces_path, workspaces)?;

    let mut record_counts = BTreeMap::new();
    record_counts.insert("projects".to_string(), project_count);
    record_counts.insert("workspaces".to_string(), workspace_count);

    let metadata = ExportMetadata {
        exported_at: Utc::now(),
        schema_version: CURRENT_VERSION,
        record_counts,
        total_records: project_count + workspace_count,
    };

    let metadata_path = directory.join(METADATA_FILE);
    let metadata_file = File::create(&metadata_path)?;
    serde_json::to_writer_pretty(metadata_file, &metadata)?;

    Ok(ExportSummary {
        directory: directory.to_path_buf(),
        metadata,
        files_written: vec![projects_path, workspaces_path, metadata_path],
    })
}

fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<usize> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// Parsed contents of an export directory; per-file errors are kept
struct ExportFiles {
    schema_warning: Option<String>,
    projects: Result<Option<Vec<Project>>>,
    workspaces: Result<Option<Vec<Workspace>>>,
}

fn read_export(directory: &Path) -> Result<ExportFiles> {
    if !directory.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Import directory not found: {}",
            directory.display()
        )));
    }

    let mut schema_warning = None;
    let metadata_path = directory.join(METADATA_FILE);
    if metadata_path.exists() {
        let metadata: ExportMetadata = serde_json::from_reader(File::open(&metadata_path)?)?;
        if metadata.schema_version > CURRENT_VERSION {
            schema_warning = Some(format!(
                "Export was written by a newer schema (v{} > v{})",
                metadata.schema_version, CURRENT_VERSION
            ));
        }
    }

    Ok(ExportFiles {
        schema_warning,
        projects: read_jsonl(&directory.join(PROJECTS_FILE)),
        workspaces: read_jsonl(&directory.join(WORKSPACES_FILE)),
    })
}

/// Import a directory written by [`export_data`].
///
/// Records are upserted by id. Projects are imported before workspaces. A
/// file that fails to parse is skipped and reported as a warning.
pub async fn import_data(store: &dyn DocumentStore, directory: &Path) -> Result<ImportSummary> {
    let source = directory.to_path_buf();
    let files = blocking(move || read_export(&source)).await?;

    let mut summary = ImportSummary::default();
    summary.warnings.extend(files.schema_warning);

    match files.projects {
        Ok(Some(projects)) => {
            for project in &projects {
                store.upsert_project(project).await?;
            }
            summary.record("projects", projects.len());
        }
        Ok(None) => summary.missing(&directory.join(PROJECTS_FILE)),
        Err(e) => summary.failed("projects", e),
    }

    match files.workspaces {
        Ok(Some(workspaces)) => {
            for workspace in &workspaces {
                store.upsert_workspace(workspace).await?;
            }
            summary.record("workspaces", workspaces.len());
        }
        Ok(None) => summary.missing(&directory.join(WORKSPACES_FILE)),
        Err(e) => summary.failed("workspaces", e),
    }

    for warning in &summary.warnings {
        warn!(directory = %directory.display(), "{}", warning);
    }

    Ok(summary)
}

fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        return Ok(None);
    }
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .map_err(|e| Error::Parse(format!("line {}: {}", index + 1, e)))?;
        records.push(record);
    }
    Ok(Some(records))
}

impl ImportSummary {
    fn record(&mut self, table: &str, count: usize) {
        self.record_counts.insert(table.to_string(), count);
        self.total_records += count;
    }

    fn missing(&mut self, path: &Path) {
        self.warnings
            .push(format!("File not found: {}", path.display()));
    }

    fn failed(&mut self, table: &str, error: Error) {
        self.warnings
            .push(format!("Failed to import {}: {}", table, error));
    }
}
