//! Remote todo service
//!
//! The sync engine talks to the server through the `RemoteStore` trait:
//! full listing plus per-item CRUD, all keyed by item id so every call
//! is safe to repeat after a failed sync. `HttpRemote` is the real REST
//! client; `MemoryRemote` is an in-process stand-in for tests.

pub mod http;
pub mod memory;

pub use http::HttpRemote;
pub use memory::MemoryRemote;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Todo;

/// Errors from the remote service
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Connection, DNS, or timeout failure
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The remote reported itself unusable (used by test doubles)
    #[error("Remote unavailable: {0}")]
    Unavailable(String),
}

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// The server-side todo collection
///
/// Implementations must keep every operation idempotent by id: repeating
/// a create or update overwrites the same record, and deleting something
/// already gone succeeds quietly.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch every item the server holds
    async fn list_all(&self) -> RemoteResult<Vec<Todo>>;

    /// Create an item, returning the server's copy
    async fn create(&self, todo: &Todo) -> RemoteResult<Todo>;

    /// Update an item, returning the server's copy
    async fn update(&self, todo: &Todo) -> RemoteResult<Todo>;

    /// Delete an item; not-found counts as success
    async fn delete(&self, id: Uuid) -> RemoteResult<()>;

    /// Cheap reachability probe, never used by reconciliation itself
    async fn health_check(&self) -> bool;
}
