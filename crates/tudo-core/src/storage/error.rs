//! Storage error types
//!
//! Typed errors for the local data files, classified from raw I/O
//! failures so messages name the file and the actual problem.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading or writing the local data files
#[derive(Error, Debug)]
pub enum StorageError {
    /// The data directory could not be created
    #[error("Cannot create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The process lacks permission for the path
    #[error("Permission denied for '{path}': {source}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The disk or quota ran out mid-write
    #[error("No space left on device while writing '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A write failed for some other reason
    #[error("Write to '{path}' failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The value could not be encoded as JSON
    #[error("Cannot serialize '{path}': {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The finished temp file could not be moved over the target
    #[error("Failed to move '{from}' into place at '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The path does not exist
    #[error("No such file: '{path}'")]
    NotFound { path: PathBuf },
}

impl StorageError {
    /// Classify an I/O failure on a write path
    pub(crate) fn write_failure(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied { path, source },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            // ErrorKind has no stable out-of-space variant, so sniff the
            // message instead
            _ if is_out_of_space(&source) => StorageError::DiskFull { path, source },
            _ => StorageError::Write { path, source },
        }
    }
}

fn is_out_of_space(source: &io::Error) -> bool {
    let message = source.to_string().to_lowercase();
    message.contains("no space left")
        || message.contains("not enough space")
        || message.contains("quota exceeded")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
