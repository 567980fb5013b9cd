//! Sync command handler

use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::sync::Mutex;
use tracing::debug;

use tudo_core::{HttpRemote, RemoteStore, SyncEngine, SyncOutcome, TodoStore};

use crate::output::Output;

/// Sync with the remote server
pub async fn sync(store: TodoStore, output: &Output) -> Result<()> {
    let config = store.config().clone();
    let remote = HttpRemote::new(&config)?;

    if !remote.health_check().await {
        let pending = store.pending_changes();
        output.message(&format!(
            "Server {} is unreachable - working offline.",
            config.server_url
        ));
        if pending > 0 {
            output.message(&format!("{} change(s) waiting to sync.", pending));
        }
        return Ok(());
    }

    let engine = SyncEngine::new(Arc::new(Mutex::new(store)), Arc::new(remote));

    match engine.sync().await {
        SyncOutcome::Completed(report) => {
            if report.is_empty() {
                output.success("Sync complete - already up to date");
            } else {
                output.success(&format!("Sync complete - {}", report));
            }
            Ok(())
        }
        SyncOutcome::Offline => {
            output.message("Server went away - working offline.");
            Ok(())
        }
        SyncOutcome::AlreadyRunning => Ok(()),
        SyncOutcome::Failed(message) => bail!("Sync failed: {}", message),
    }
}

/// Sync quietly (for auto-sync) - no output on success
pub async fn sync_quiet(store: TodoStore) -> Result<()> {
    let config = store.config().clone();
    let remote = HttpRemote::new(&config)?;

    // An unreachable server is not an error here; queued changes keep waiting
    if !remote.health_check().await {
        debug!("server unreachable, skipping auto-sync");
        return Ok(());
    }

    let engine = SyncEngine::new(Arc::new(Mutex::new(store)), Arc::new(remote));

    match engine.sync().await {
        SyncOutcome::Failed(message) => bail!("{}", message),
        _ => Ok(()),
    }
}
