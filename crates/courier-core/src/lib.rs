//! Courier Core Library
//!
//! This crate provides the backend of the Courier desktop API client:
//! - Bootstrap (session check, organization loading, legacy-project migration)
//! - Storage (SQLite document store + JSONL export/import)
//! - Remote API client for organizations, profile, billing and feature flags
//! - Sync engine collaborator with interactive conflict resolution
//! - Route-layer loaders and actions consumed by the UI shell

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod error;
pub mod reconcile;
pub mod remote;
pub mod session;
pub mod storage;
pub mod sync;


pub use error::{Error, Result};
