//! Tudo Core Library
//!
//! This crate provides the core functionality for tudo, an offline-first
//! todo list that syncs across devices through a small REST server.
//!
//! # Architecture
//!
//! - **Local JSON files**: Source of truth on each device; every change
//!   lands on disk before anything touches the network
//! - **Deletion ledger**: Ids removed while offline, kept until the
//!   server confirms the delete
//! - **Last-writer-wins sync**: Per-item conflicts resolve by
//!   `updated_at`, ties keep the server's copy
//!
//! All reads are served from the in-memory item list; the server is only
//! consulted during a sync pass.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = TodoStore::open()?;
//!
//! // Add a todo
//! let todo = store.add("buy milk")?;
//!
//! // Complete it
//! store.toggle(todo.id)?;
//!
//! // Push and pull changes
//! let engine = SyncEngine::new(store, remote);
//! engine.sync().await;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: The todo item and its validation rules
//! - `ledger`: Pending deletions awaiting server confirmation
//! - `storage`: Atomic JSON persistence
//! - `remote`: HTTP client for the sync server
//! - `sync`: Reconciliation engine and connectivity monitor
//! - `config`: Application configuration

pub mod config;
pub mod ledger;
pub mod models;
pub mod remote;
pub mod storage;
pub mod store;
pub mod sync;

pub use config::Config;
pub use ledger::DeletionLedger;
pub use models::{Todo, ValidationError};
pub use remote::{HttpRemote, MemoryRemote, RemoteError, RemoteStore};
pub use storage::{LocalStore, StorageError};
pub use store::{StoreError, TodoStore};
pub use sync::{
    ConnectivityMonitor, SyncEngine, SyncEvent, SyncOutcome, SyncReport, SyncStatus,
};
