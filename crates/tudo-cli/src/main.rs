//! Tudo CLI
//!
//! Command-line interface for tudo - offline-first todos that sync.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tudo_core::TodoStore;

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "tudo")]
#[command(about = "Tudo - Offline-first todos that sync across devices")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print ids only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new todo
    Add {
        /// The todo text
        text: String,
    },
    /// List todos (default when no command given)
    #[command(alias = "ls")]
    List {
        /// Hide completed todos
        #[arg(short, long)]
        active: bool,
    },
    /// Toggle a todo between done and open
    Done {
        /// Todo ID (full UUID or prefix)
        id: String,
    },
    /// Change a todo's text
    Edit {
        /// Todo ID (full UUID or prefix)
        id: String,
        /// The new text
        text: String,
    },
    /// Delete a todo
    #[command(alias = "rm")]
    Delete {
        /// Todo ID (full UUID or prefix)
        id: String,
    },
    /// Move a todo to a new position
    #[command(alias = "mv")]
    Move {
        /// Todo ID (full UUID or prefix)
        id: String,
        /// Target position, starting at 0
        position: usize,
    },
    /// View or change settings
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (item counts, sync state)
    Status,
    /// Sync with the remote server
    Sync,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Print the active settings
    Show,
    /// Change one setting
    Set {
        /// Setting name (data_dir, server_url, sync_enabled, request_timeout_secs)
        key: String,
        /// New value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config doesn't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return run_config_command(command.clone(), &output);
    }

    let mut store = TodoStore::open()?;

    // No command defaults to listing
    let command = cli.command.unwrap_or(Commands::List { active: false });

    // Manual sync takes over the store
    if matches!(command, Commands::Sync) {
        return commands::sync::sync(store, &output).await;
    }

    let is_write = matches!(
        command,
        Commands::Add { .. }
            | Commands::Done { .. }
            | Commands::Edit { .. }
            | Commands::Delete { .. }
            | Commands::Move { .. }
    );

    let result = match command {
        Commands::Add { text } => commands::todo::add(&mut store, text, &output),
        Commands::List { active } => commands::todo::list(&store, active, &output),
        Commands::Done { id } => commands::todo::done(&mut store, id, &output),
        Commands::Edit { id, text } => commands::todo::edit(&mut store, id, text, &output),
        Commands::Delete { id } => commands::todo::delete(&mut store, id, &output),
        Commands::Move { id, position } => {
            commands::todo::move_to(&mut store, id, position, &output)
        }
        Commands::Status => commands::status::show(&store, &output).await,
        Commands::Config { .. } | Commands::Sync => unreachable!(), // Handled above
    };

    // Push changes after successful writes
    if is_write && result.is_ok() {
        auto_sync(store, &output).await;
    }

    result
}

fn run_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

/// Best-effort push after a write; never fails the command
async fn auto_sync(store: TodoStore, output: &Output) {
    if !store.config().sync_enabled {
        return;
    }

    if let Err(err) = commands::sync::sync_quiet(store).await {
        if !output.is_quiet() {
            eprintln!("⚠ Auto-sync failed: {err}");
        }
    }
}

/// Route tracing to stderr so logs never mix with command output
fn init_tracing() {
    let filter = EnvFilter::try_from_env("TUDO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
