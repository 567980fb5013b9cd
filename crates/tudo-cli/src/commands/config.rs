//! Settings commands

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use tudo_core::Config;

use crate::output::{Output, OutputFormat};

/// Print every setting and where the config file lives
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "server_url": config.server_url,
                    "sync_enabled": config.sync_enabled,
                    "request_timeout_secs": config.request_timeout_secs
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  server_url:           {}", config.server_url);
            println!("  sync_enabled:         {}", config.sync_enabled);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Update one setting and persist the file
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    match key.as_str() {
        "data_dir" => {
            config.data_dir = PathBuf::from(&value);
        }
        "server_url" => {
            config.server_url = value.clone();
        }
        "sync_enabled" => {
            config.sync_enabled = value
                .parse()
                .context("sync_enabled takes 'true' or 'false'")?;
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = value
                .parse()
                .context("request_timeout_secs takes a whole number of seconds")?;
        }
        _ => {
            bail!(
                "No such setting: '{key}'\n\
                 Settings: data_dir, server_url, sync_enabled, request_timeout_secs"
            );
        }
    }

    config.save().context("Failed to save configuration")?;

    output.success(&format!("Set {key} = {value}"));

    Ok(())
}
