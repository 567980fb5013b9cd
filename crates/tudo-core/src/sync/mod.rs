//! Sync engine for the tudo REST server
//!
//! Provides offline-first synchronization between the local store and a
//! remote HTTP server.
//!
//! ## Protocol
//!
//! One pass of last-writer-wins reconciliation:
//! 1. Fetch the full remote list
//! 2. Confirm pending deletions recorded while offline
//! 3. Resolve per-item conflicts by `updated_at`, pushing local wins
//! 4. Commit the merged list locally and clear the ledger
//!
//! ## Usage
//!
//! ```ignore
//! let engine = Arc::new(SyncEngine::new(store, remote));
//! let monitor = ConnectivityMonitor::spawn(engine.clone(), DEFAULT_POLL_INTERVAL);
//! engine.sync().await;
//! ```

mod engine;
mod monitor;
mod reconcile;

pub use engine::{SyncEngine, SyncEvent, SyncOutcome, SyncStatus};
pub use monitor::{ConnectivityMonitor, DEFAULT_POLL_INTERVAL};
pub use reconcile::{reconcile, ReconcileOutcome, SyncReport};
