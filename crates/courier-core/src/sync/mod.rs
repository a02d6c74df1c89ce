//! Version-control collaborator used during bootstrap

pub mod conflict;
pub mod driver;
pub mod engine;

pub use conflict::{
    ChannelConflictResolver, ConflictInbox, ConflictPolicy, ConflictRequest, ConflictResolver,
    MergeConflict, conflict_channel,
};
pub use driver::{FileSystemDriver, VERSION_CONTROL_DIR};
pub use engine::{
    FileSystemSyncFactory, LocalSyncEngine, RemoteProjectMeta, SyncEngine, SyncEngineFactory,
};
