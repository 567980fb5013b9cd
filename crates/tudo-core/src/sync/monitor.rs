//! Connectivity monitor
//!
//! Polls the server's health endpoint on an interval and feeds the
//! answer into the engine. The offline-to-online edge also triggers a
//! sync, so changes queued during an outage push as soon as the server
//! is reachable again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::sync::engine::{SyncEngine, SyncStatus};

/// How often the server is probed when no interval is given
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to the background polling task
///
/// Dropping the handle leaves the task running for the life of the
/// runtime; call [`stop`](Self::stop) for an orderly shutdown.
pub struct ConnectivityMonitor {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ConnectivityMonitor {
    /// Start polling the engine's remote every `interval`
    ///
    /// The first probe runs immediately so startup does not wait a full
    /// interval to learn the server is down.
    pub fn spawn(engine: Arc<SyncEngine>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        debug!("connectivity monitor stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let healthy = engine.remote().health_check().await;
                        let was_offline = engine.status() == SyncStatus::Offline;
                        engine.set_online(healthy);

                        if healthy && was_offline {
                            info!("server reachable again, triggering sync");
                            let _ = engine.sync().await;
                        }
                    }
                }
            }
        });

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Stop polling and wait for the task to exit
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }
}
