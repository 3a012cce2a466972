//! Watches the data directory and imports each new export exactly once.
//!
//! Notifications from `notify` are queued on a channel and drained by a single
//! loop, so at most one file is ever being imported.

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::services::file_state::{self, has_data_extension, is_marked};
use crate::services::import_processor::{ImportProcessor, ImportSummary};
use crate::services::status_line::StatusLine;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("watch path {0} does not exist or is not a directory")]
    MissingDirectory(PathBuf),
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// What happened to one notified path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    /// Filtered out: directory, gone, wrong extension or already marked
    Discarded,
    Imported {
        summary: ImportSummary,
        marked: PathBuf,
    },
    /// Import or rename failed; the file keeps its original name
    Failed,
}

/// Creations, plus files renamed or moved into the watched tree.
pub fn is_arrival(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Name(
                RenameMode::To | RenameMode::Both | RenameMode::Any
            ))
    )
}

/// Regular, unmarked `.csv` files only.
pub fn should_import(path: &Path) -> bool {
    path.is_file() && has_data_extension(path) && !is_marked(path)
}

pub struct ImportWatcher<W: Write = io::Stdout> {
    watch_path: PathBuf,
    processor: Arc<ImportProcessor>,
    status: StatusLine<W>,
}

impl ImportWatcher {
    pub fn new(watch_path: PathBuf, processor: Arc<ImportProcessor>) -> Self {
        Self::with_status(watch_path, processor, StatusLine::stdout())
    }
}

impl<W: Write> ImportWatcher<W> {
    pub fn with_status(
        watch_path: PathBuf,
        processor: Arc<ImportProcessor>,
        status: StatusLine<W>,
    ) -> Self {
        Self {
            watch_path,
            processor,
            status,
        }
    }

    pub fn status(&self) -> &StatusLine<W> {
        &self.status
    }

    /// Run until `shutdown` resolves. A file already being imported is
    /// finished before the loop notices the shutdown.
    pub async fn watch<F>(&mut self, shutdown: F) -> Result<(), WatchError>
    where
        F: Future<Output = ()>,
    {
        if !self.watch_path.is_dir() {
            return Err(WatchError::MissingDirectory(self.watch_path.clone()));
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means we are shutting down
            let _ = tx.send(res);
        })?;
        watcher.watch(&self.watch_path, RecursiveMode::Recursive)?;
        info!(path = %self.watch_path.display(), "Watching for workout exports");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping watcher");
                    break;
                }
                received = rx.recv() => match received {
                    Some(Ok(event)) => self.handle_event(event).await,
                    Some(Err(e)) => warn!(error = %e, "File watcher reported an error"),
                    None => break,
                },
            }
        }

        drop(watcher);
        Ok(())
    }

    async fn handle_event(&mut self, event: Event) {
        if !is_arrival(&event.kind) {
            debug!(kind = ?event.kind, "Ignoring notification");
            return;
        }
        for path in &event.paths {
            self.handle_path(path).await;
        }
    }

    /// Filter, import and mark a single path.
    pub async fn handle_path(&mut self, path: &Path) -> PathOutcome {
        if !should_import(path) {
            debug!(path = %path.display(), "Discarding notification");
            return PathOutcome::Discarded;
        }

        info!(file = %path.display(), "Importing workout export");
        let summary = match self.processor.process_file(path).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(file = %path.display(), error = %e, "Import failed, file left in place");
                return PathOutcome::Failed;
            }
        };

        if let Err(e) = self.status.show(&format!("Added {} item(s)", summary.added)) {
            warn!(error = %e, "Failed to write status line");
        }

        match file_state::mark_processed(path) {
            Ok(marked) => PathOutcome::Imported { summary, marked },
            Err(e) => {
                error!(file = %path.display(), error = %e, "Imported but could not mark file");
                PathOutcome::Failed
            }
        }
    }
}
