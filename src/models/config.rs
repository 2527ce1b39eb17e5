//! Configuration model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Application configuration.
///
/// Holds user-level defaults that individual scripts can extend or override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Databases available to every script on this machine.
    #[serde(default)]
    pub databases: HashMap<String, DatabaseConfig>,
}

/// A named database the command factory can connect to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
    /// Whether connections take part in group transactions.
    #[serde(default = "default_transactional")]
    pub transactional: bool,
}

fn default_transactional() -> bool {
    true
}

impl DatabaseConfig {
    /// Create a non-transactional database entry.
    pub fn plain<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            transactional: false,
        }
    }

    /// Create a transactional database entry.
    pub fn transactional<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            transactional: true,
        }
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("runsheet")
}

/// Load configuration from file.
///
/// Falls back to an empty configuration when the file is missing or invalid.
pub fn load_config() -> Config {
    let config_path = dirs_config_path().join("config.toml");

    if config_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str(&content) {
                return config;
            }
        }
    }

    Config::default()
}
