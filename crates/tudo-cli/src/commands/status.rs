//! Status command

use anyhow::Result;

use tudo_core::{HttpRemote, RemoteStore, SyncStatus, TodoStore};

use crate::output::{Output, OutputFormat};

/// Summarize items, sync state, and storage for this device
pub async fn show(store: &TodoStore, output: &Output) -> Result<()> {
    let config = store.config();

    let reachable = match HttpRemote::new(config) {
        Ok(remote) => remote.health_check().await,
        Err(_) => false,
    };
    let status = if reachable {
        SyncStatus::Idle
    } else {
        SyncStatus::Offline
    };
    let pending = store.pending_changes();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "status": status.to_string(),
                    "items": store.len(),
                    "pending_changes": pending,
                    "last_sync": store.last_sync().map(|t| t.timestamp_millis()),
                    "server_url": config.server_url,
                    "server_reachable": reachable,
                    "sync_enabled": config.sync_enabled
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", pending);
        }
        OutputFormat::Human => {
            let open = store.items().iter().filter(|t| !t.completed).count();

            println!("Tudo Status");
            println!("===========");
            println!();
            println!("Items:");
            println!("  Total:   {}", store.len());
            println!("  Open:    {}", open);
            println!("  Pending: {} change(s) to sync", pending);
            println!();
            println!("Sync:");
            println!("  Status:  {}", status);
            println!(
                "  Server:  {} ({})",
                config.server_url,
                if reachable { "reachable" } else { "unreachable" }
            );
            println!(
                "  Auto:    {}",
                if config.sync_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            match store.last_sync() {
                Some(t) => println!("  Last:    {}", t.format("%Y-%m-%d %H:%M")),
                None => println!("  Last:    never"),
            }
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
        }
    }

    Ok(())
}
