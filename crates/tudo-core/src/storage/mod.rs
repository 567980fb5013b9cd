//! Storage layer
//!
//! Handles persistence of the local data files.
//!
//! ## Architecture
//!
//! Three JSON files under the data directory hold the todo list, the
//! pending-deletion ids, and the last-sync timestamp. Every save is a
//! total replace through an atomic write, so whatever was last written
//! is read back verbatim.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::LocalStore;
