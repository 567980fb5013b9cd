//! Local data file persistence
//!
//! Handles saving and loading the todo list, the pending-deletion ledger,
//! and the last-sync timestamp to/from the filesystem. Uses atomic writes
//! (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/tudo/` (configurable via `Config`)
//!
//! Files:
//! - `todos.json` - the full item list, total-replace on every save
//! - `pending_deletes.json` - ids deleted locally but not yet synced
//! - `last_sync.json` - epoch-millisecond timestamp of the last successful sync

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::config::Config;
use crate::models::Todo;
use crate::storage::error::{StorageError, StorageResult};

/// Persistence layer for the local data files
///
/// Reads are forgiving: a missing or unreadable file yields the empty value
/// so the app always starts, with a warning logged for corrupt data. Writes
/// are atomic and report their errors.
pub struct LocalStore {
    config: Config,
}

impl LocalStore {
    /// Create a new persistence handler with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if a todo list has been persisted
    pub fn exists(&self) -> bool {
        self.config.todos_path().exists()
    }

    /// Load the todo list
    ///
    /// Returns an empty list if nothing has been persisted yet or the file
    /// cannot be read or parsed.
    pub fn load_items(&self) -> Vec<Todo> {
        load_or_default(&self.config.todos_path())
    }

    /// Save the todo list, replacing whatever was persisted before
    pub fn save_items(&self, items: &[Todo]) -> StorageResult<()> {
        save_json(&self.config.todos_path(), items)
    }

    /// Load the pending-deletion ids
    pub fn load_pending_deletes(&self) -> Vec<Uuid> {
        load_or_default(&self.config.pending_deletes_path())
    }

    /// Save the pending-deletion ids
    pub fn save_pending_deletes(&self, ids: &[Uuid]) -> StorageResult<()> {
        save_json(&self.config.pending_deletes_path(), ids)
    }

    /// Load the last successful sync time
    ///
    /// Returns `None` if no sync has completed yet or the file is unreadable.
    pub fn load_last_sync(&self) -> Option<DateTime<Utc>> {
        let path = self.config.last_sync_path();
        let millis: Option<i64> = load_optional(&path);
        match millis {
            Some(ms) => {
                let parsed = DateTime::from_timestamp_millis(ms);
                if parsed.is_none() {
                    warn!(path = %path.display(), millis = ms, "last sync timestamp out of range, ignoring");
                }
                parsed
            }
            None => None,
        }
    }

    /// Save the last successful sync time as epoch milliseconds
    pub fn save_last_sync(&self, at: DateTime<Utc>) -> StorageResult<()> {
        save_json(&self.config.last_sync_path(), &at.timestamp_millis())
    }
}

/// Load a JSON value, falling back to the type's default
///
/// Missing files are normal (first run). Unreadable or corrupt files are
/// logged and treated as missing so callers always get a usable value.
fn load_or_default<T: serde::de::DeserializeOwned + Default>(path: &Path) -> T {
    load_optional(path).unwrap_or_default()
}

fn load_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        return None;
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read data file, treating as empty");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "corrupt data file, treating as empty");
            None
        }
    }
}

/// Serialize a value to JSON and write it atomically
fn save_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec(value).map_err(|source| StorageError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, &bytes)
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Temp file in the same directory so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .map_err(|err| StorageError::write_failure(&temp_path, err))?;

    file.write_all(data)
        .map_err(|err| StorageError::write_failure(&temp_path, err))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|err| StorageError::write_failure(&temp_path, err))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::Rename {
        from: temp_path,
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
