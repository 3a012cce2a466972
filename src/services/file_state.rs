//! Marks imported exports by renaming them in place.
//!
//! The marker in the file stem is the only record of completion.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Appended to the file stem once an export has been imported
pub const PROCESSED_MARKER: &str = "_imported";

/// Extension of the exports we pick up
pub const DATA_EXTENSION: &str = "csv";

#[derive(Error, Debug)]
pub enum FileStateError {
    #[error("{0} has no file name")]
    NoFileName(PathBuf),
    #[error("{0} is already marked as imported")]
    AlreadyMarked(PathBuf),
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// True when the file stem already carries [`PROCESSED_MARKER`].
pub fn is_marked(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.ends_with(PROCESSED_MARKER))
        .unwrap_or(false)
}

pub fn has_data_extension(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(DATA_EXTENSION)
}

/// `dir/name.ext` -> `dir/name_imported.ext`
pub fn marked_path(path: &Path) -> Result<PathBuf, FileStateError> {
    let stem = path
        .file_stem()
        .ok_or_else(|| FileStateError::NoFileName(path.to_path_buf()))?;

    let mut name = stem.to_os_string();
    name.push(PROCESSED_MARKER);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }

    Ok(path.with_file_name(name))
}

/// Rename a fully imported file so it is never picked up again.
pub fn mark_processed(path: &Path) -> Result<PathBuf, FileStateError> {
    if is_marked(path) {
        return Err(FileStateError::AlreadyMarked(path.to_path_buf()));
    }

    let target = marked_path(path)?;
    if target.exists() {
        tracing::warn!(
            from = %path.display(),
            to = %target.display(),
            "Replacing an earlier import with the same name"
        );
    }
    std::fs::rename(path, &target).map_err(|source| FileStateError::Rename {
        from: path.to_path_buf(),
        to: target.clone(),
        source,
    })?;

    tracing::debug!(from = %path.display(), to = %target.display(), "Marked file as imported");
    Ok(target)
}
