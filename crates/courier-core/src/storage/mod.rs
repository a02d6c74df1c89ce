//! Storage layer - local document store on SQLite + JSONL export
//!
//! # Architecture
//!
//! - `store`: the [`DocumentStore`] trait and its query filters
//! - `sqlite`: the SQLite implementation of the store
//! - `database`: connection pool management and initialization
//! - `migrations`: schema versioning and automatic migration
//! - `seed`: singleton records created at start-up
//! - `export`: JSONL export/import of all local data
//!
//! # Usage
//!
//! ```ignore
//! use courier_core::storage::{DocumentStore, ProjectFilter, SqliteDocumentStore};
//!
//! let store = SqliteDocumentStore::in_memory().await?;
//! let legacy = store.find_projects(&ProjectFilter::parent_unset()).await?;
//! ```

pub mod database;
pub mod export;
pub mod migrations;
pub mod seed;
pub mod sqlite;
pub mod store;

pub use database::{DATABASE_FILE, Database, DatabaseConfig};
pub use export::{ExportMetadata, ExportScope, ExportSummary, ImportSummary, export_data, import_data};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};
pub use seed::ensure_scratchpad;
pub use sqlite::SqliteDocumentStore;
pub use store::{DocumentStore, ParentFilter, ProjectFilter, WorkspaceFilter};
