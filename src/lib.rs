//! aw-importer-ios-fitness - imports iOS workout exports into ActivityWatch

pub mod cli;
pub mod config;
pub mod models;
pub mod services;
pub mod storage;

// Re-export main types for convenience
pub use crate::config::Config;
pub use crate::models::{ActivityRecord, NewEvent, StoredEvent};
pub use crate::services::{ImportProcessor, ImportSummary, ImportWatcher, PathOutcome};
pub use crate::storage::{ActivityWatchClient, EventStore, StoreError};

/// Client name reported to ActivityWatch and used for the config directory
pub const WATCHER_NAME: &str = "aw-importer-ios-fitness";

/// Bucket type for imported workouts
pub const BUCKET_TYPE: &str = "lifecycle_data";
