pub mod dedup;
pub mod file_state;
pub mod file_watcher;
pub mod import_processor;
pub mod record_builder;
pub mod status_line;

// Re-export for convenience
pub use file_watcher::{ImportWatcher, PathOutcome, WatchError};
pub use import_processor::{ImportError, ImportProcessor, ImportSummary};
pub use status_line::StatusLine;
