//! Imports one workout export into the event store.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::event::NewEvent;
use crate::services::dedup::{self, ProcessedIdentitySet};
use crate::services::record_builder::{self, ExportError};
use crate::storage::event_store::{EventStore, StoreError};

/// File-level failures. The file stays unmarked when any of these occur.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed export: {0}")]
    Export(#[from] ExportError),
    #[error("event store error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of one file import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records submitted to the bucket
    pub added: usize,
    /// Rows whose identity was already in the bucket
    pub duplicates: usize,
    /// Rows that could not be turned into a record
    pub skipped: usize,
}

pub struct ImportProcessor {
    store: Arc<dyn EventStore>,
    bucket_id: String,
}

impl ImportProcessor {
    pub fn new(store: Arc<dyn EventStore>, bucket_id: String) -> Self {
        Self { store, bucket_id }
    }

    /// Import every new row of `path`. Row problems are logged and skipped;
    /// only read, header and store failures are returned.
    pub async fn process_file(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        // Fetched fresh for every file
        let existing = self.store.list_events(&self.bucket_id).await?;
        let processed = ProcessedIdentitySet::from_events(&existing);
        debug!(
            bucket = %self.bucket_id,
            known = processed.len(),
            "Loaded existing identities"
        );

        let contents = tokio::fs::read(path).await.map_err(|source| ImportError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let rows = record_builder::parse_export(&contents)?;

        let mut summary = ImportSummary::default();
        let mut batch: Vec<NewEvent> = Vec::new();
        let mut batch_identities = HashSet::new();

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            let record = match row {
                Ok(record) => record,
                Err(e) => {
                    warn!(file = %path.display(), row = row_number, error = %e, "Skipping row");
                    summary.skipped += 1;
                    continue;
                }
            };

            let identity = dedup::identity(&record);
            if processed.is_duplicate(&identity) {
                summary.duplicates += 1;
                continue;
            }
            // Not filtered: the set only reflects the bucket at the start of the run
            if !batch_identities.insert(identity.clone()) {
                warn!(
                    file = %path.display(),
                    row = row_number,
                    identity = %identity,
                    "Identity repeats within file"
                );
            }

            batch.push(record.into_event());
        }

        summary.added = batch.len();
        if !batch.is_empty() {
            self.store.insert_events(&self.bucket_id, batch).await?;
        }

        info!(
            file = %path.display(),
            added = summary.added,
            duplicates = summary.duplicates,
            skipped = summary.skipped,
            "Import finished"
        );
        Ok(summary)
    }
}
