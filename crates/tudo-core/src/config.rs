//! Application configuration
//!
//! Settings come from three layers: built-in defaults, the TOML config
//! file, and `TUDO_*` environment variables. Later layers win, so an
//! env var beats the file and the file beats the defaults.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const ENV_CONFIG: &str = "TUDO_CONFIG";
const ENV_DATA_DIR: &str = "TUDO_DATA_DIR";
const ENV_SERVER_URL: &str = "TUDO_SERVER_URL";
const ENV_SYNC_ENABLED: &str = "TUDO_SYNC_ENABLED";

/// Server used when no other URL is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

/// Default remote request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the local data files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL of the todo server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Whether write commands trigger an automatic sync
    #[serde(default)]
    pub sync_enabled: bool,

    /// Timeout for remote CRUD requests, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            server_url: default_server_url(),
            sync_enabled: false,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// Reads the config file if it exists, applies env overrides, and
    /// creates the data directory.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error; defaults are used instead. Env
    /// overrides apply either way.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("Invalid TOML in config file {}", path.display()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Cannot read config file {}", path.display()))
            }
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string, with env overrides applied
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(toml_content).context("Invalid config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(dir) = env_override(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(url) = env_override(ENV_SERVER_URL) {
            self.server_url = url;
        }

        if let Some(flag) = env_override(ENV_SYNC_ENABLED) {
            self.sync_enabled = flag == "1" || flag.eq_ignore_ascii_case("true");
        }
    }

    fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Cannot create data directory {}", self.data_dir.display()))
    }

    /// Write the configuration to the config file as TOML
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path();
        let content = toml::to_string_pretty(self).context("Cannot serialize configuration")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create config directory {}", parent.display()))?;
        }

        std::fs::write(&path, content)
            .with_context(|| format!("Cannot write config file {}", path.display()))
    }

    /// Where the config file lives
    ///
    /// `TUDO_CONFIG` overrides the platform config directory.
    pub fn config_file_path() -> PathBuf {
        if let Some(path) = env_override(ENV_CONFIG) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tudo")
            .join("config.toml")
    }

    /// Path of the persisted todo list
    pub fn todos_path(&self) -> PathBuf {
        self.data_dir.join("todos.json")
    }

    /// Path of the pending-deletion ids
    pub fn pending_deletes_path(&self) -> PathBuf {
        self.data_dir.join("pending_deletes.json")
    }

    /// Path of the last-sync timestamp
    pub fn last_sync_path(&self) -> PathBuf {
        self.data_dir.join("last_sync.json")
    }
}

/// Read an env var, treating unset and blank the same
fn env_override(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tudo")
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
