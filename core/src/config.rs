//! Configuration management (`config.toml`)
//!
//! Handles loading, saving, and providing defaults for host settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gameshelf_shared::{MAX_CONFIG_BYTES, read_file_with_limit};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where bundles are looked for
    #[serde(default)]
    pub library: LibraryConfig,
    /// Asset server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Game library configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory scanned for `.zip` bundles (default: `<data dir>/games`)
    #[serde(default = "default_games_dir")]
    pub games_dir: PathBuf,
}

/// Asset server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Directory served over HTTP (default: working directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            games_dir: default_games_dir(),
        }
    }
}

impl ServerConfig {
    /// The configured root, or `.` when unset.
    pub fn root_or_working_dir(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn default_games_dir() -> PathBuf {
    data_dir()
        .map(|dir| dir.join("games"))
        .unwrap_or_else(|| PathBuf::from("games"))
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Gameshelf\config`
/// On macOS: `~/Library/Application Support/io.gameshelf.Gameshelf`
/// On Linux: `~/.config/Gameshelf`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.gameshelf", "", "Gameshelf")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.gameshelf", "", "Gameshelf")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    let Some(path) = config_dir().map(|dir| dir.join(CONFIG_FILE)) else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    load_from(&path).unwrap_or_else(|e| {
        tracing::warn!("Ignoring config file: {:#}", e);
        Config::default()
    })
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_from(path: &Path) -> Result<Config> {
    let bytes = read_file_with_limit(path, MAX_CONFIG_BYTES)?;
    let content = String::from_utf8(bytes)
        .with_context(|| format!("Config is not UTF-8: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config: {}", path.display()))
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
pub fn save(config: &Config) -> Result<()> {
    match config_dir() {
        Some(dir) => save_to(config, &dir.join(CONFIG_FILE)),
        None => Ok(()),
    }
}

/// Saves the configuration to a specific file, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
