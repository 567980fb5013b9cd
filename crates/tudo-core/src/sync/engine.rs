//! Sync orchestrator
//!
//! Owns the status state machine and runs reconciliation passes against
//! the remote. At most one pass runs at a time; triggers arriving while
//! one is in flight are dropped, not queued, because a pass always works
//! from a fresh snapshot and a queued rerun would do the same work again.
//!
//! Status moves through `idle -> syncing -> idle` on success and
//! `syncing -> error` on failure. Losing connectivity forces `offline`
//! immediately from any state; a pass already in flight still finishes
//! and commits, the status just reports the outage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use crate::remote::RemoteStore;
use crate::store::TodoStore;
use crate::sync::reconcile::{reconcile, SyncReport};

/// Where the engine currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No pass running, last one (if any) succeeded
    Idle,
    /// A pass is in flight
    Syncing,
    /// The last pass failed; the error is kept until a pass succeeds
    Error,
    /// The server is unreachable, syncing is gated off
    Offline,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Error => "error",
            SyncStatus::Offline => "offline",
        };
        write!(f, "{}", label)
    }
}

/// Notifications emitted while the engine works
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The status changed to a new value
    StatusChanged(SyncStatus),
    /// A pass finished and its merge was committed
    Completed(SyncReport),
    /// A pass failed; local state is untouched
    Error(String),
}

/// What a single trigger call amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A pass ran and committed
    Completed(SyncReport),
    /// The engine is offline, nothing was attempted
    Offline,
    /// Another pass was already in flight, the trigger was dropped
    AlreadyRunning,
    /// The pass failed before committing anything
    Failed(String),
}

/// Coordinates reconciliation passes between a [`TodoStore`] and a remote
///
/// The engine is shared behind `Arc` between callers and the
/// connectivity monitor. Status is observable three ways: polled with
/// [`status`](Self::status), watched with
/// [`subscribe_status`](Self::subscribe_status), or streamed as
/// [`SyncEvent`]s via [`take_events`](Self::take_events).
pub struct SyncEngine {
    store: Arc<Mutex<TodoStore>>,
    remote: Arc<dyn RemoteStore>,
    status_tx: watch::Sender<SyncStatus>,
    status_rx: watch::Receiver<SyncStatus>,
    error_tx: watch::Sender<Option<String>>,
    error_rx: watch::Receiver<Option<String>>,
    event_tx: mpsc::UnboundedSender<SyncEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<SyncEvent>>,
    online: AtomicBool,
    in_flight: AtomicBool,
}

impl SyncEngine {
    /// Create an engine in the `idle` state, assumed online
    pub fn new(store: Arc<Mutex<TodoStore>>, remote: Arc<dyn RemoteStore>) -> Self {
        let (status_tx, status_rx) = watch::channel(SyncStatus::Idle);
        let (error_tx, error_rx) = watch::channel(None);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            store,
            remote,
            status_tx,
            status_rx,
            error_tx,
            error_rx,
            event_tx,
            event_rx: Some(event_rx),
            online: AtomicBool::new(true),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Start in the `offline` state instead
    ///
    /// Used when a health probe already failed before the engine was
    /// built, so the first status observers see matches reality.
    pub fn with_offline_start(self) -> Self {
        self.online.store(false, Ordering::SeqCst);
        self.set_status(SyncStatus::Offline);
        self
    }

    /// Current status
    pub fn status(&self) -> SyncStatus {
        *self.status_rx.borrow()
    }

    /// A watch handle that sees every status change
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// Take the event stream; only the first caller gets it
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SyncEvent>> {
        self.event_rx.take()
    }

    /// The error message from the last failed pass, if the failure is
    /// still current
    pub fn last_error(&self) -> Option<String> {
        self.error_rx.borrow().clone()
    }

    /// The remote this engine syncs against
    pub fn remote(&self) -> Arc<dyn RemoteStore> {
        Arc::clone(&self.remote)
    }

    /// The store this engine commits into
    pub fn store(&self) -> Arc<Mutex<TodoStore>> {
        Arc::clone(&self.store)
    }

    /// Whether triggers are currently allowed through
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Record a connectivity change
    ///
    /// Going offline forces the status to `offline` right away, even
    /// while a pass is in flight; that pass still finishes and commits.
    /// Going online only reopens the gate, it does not start a pass.
    pub fn set_online(&self, online: bool) {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        if !online {
            self.set_status(SyncStatus::Offline);
        } else if !was_online {
            debug!("connectivity restored");
        }
    }

    /// Trigger a reconciliation pass
    ///
    /// Returns without doing anything when the engine is offline or a
    /// pass is already in flight. On failure the local items and the
    /// deletion ledger are left exactly as they were.
    pub async fn sync(&self) -> SyncOutcome {
        if !self.is_online() {
            self.set_status(SyncStatus::Offline);
            return SyncOutcome::Offline;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sync already in flight, dropping trigger");
            return SyncOutcome::AlreadyRunning;
        }
        // Reset on drop; a cancelled pass must not leave the flag stuck
        let _guard = InFlightGuard(&self.in_flight);

        self.set_status(SyncStatus::Syncing);
        let _ = self.error_tx.send(None);
        info!("starting sync");

        match self.run_pass().await {
            Ok(report) => {
                self.finish(SyncStatus::Idle);
                info!(%report, "sync complete");
                self.emit(SyncEvent::Completed(report.clone()));
                SyncOutcome::Completed(report)
            }
            Err(message) => {
                let _ = self.error_tx.send(Some(message.clone()));
                self.finish(SyncStatus::Error);
                warn!(error = %message, "sync failed");
                self.emit(SyncEvent::Error(message.clone()));
                SyncOutcome::Failed(message)
            }
        }
    }

    /// One full pass: snapshot, reconcile, commit
    async fn run_pass(&self) -> Result<SyncReport, String> {
        // Fresh snapshot; the store lock is not held across the network
        let (local, pending) = {
            let store = self.store.lock().await;
            (store.items().to_vec(), store.pending_deletes().clone())
        };

        let outcome = reconcile(self.remote.as_ref(), local, &pending)
            .await
            .map_err(|e| e.to_string())?;

        let mut store = self.store.lock().await;
        store
            .apply_sync(outcome.merged, Utc::now())
            .map_err(|e| e.to_string())?;

        Ok(outcome.report)
    }

    /// Resolve the end-of-pass status, respecting a mid-pass outage
    fn finish(&self, status: SyncStatus) {
        if self.is_online() {
            self.set_status(status);
        } else {
            self.set_status(SyncStatus::Offline);
        }
    }

    fn set_status(&self, status: SyncStatus) {
        let changed = self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
        if changed {
            self.emit(SyncEvent::StatusChanged(status));
        }
    }

    fn emit(&self, event: SyncEvent) {
        // Nobody listening is fine
        let _ = self.event_tx.send(event);
    }
}

/// Clears the in-flight flag when a pass ends, however it ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
