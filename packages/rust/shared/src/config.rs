//! Application configuration for linkdex.
//!
//! User config lives at `~/.linkdex/linkdex.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LinkdexError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "linkdex.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".linkdex";

/// Default User-Agent sent with fetch requests.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/81.0.4044.113 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching linkdex.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Index sink connection settings.
    #[serde(default)]
    pub index: IndexConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Number of parallel pool workers.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// User-Agent header for page fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            user_agent: default_user_agent(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_pool_size() -> usize {
    4
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_fetch_timeout_secs() -> u64 {
    10
}

/// `[index]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index sink host.
    #[serde(default = "default_index_host")]
    pub host: String,

    /// Index sink port.
    #[serde(default = "default_index_port")]
    pub port: u16,

    /// Index name documents are written under.
    #[serde(default = "default_index_name")]
    pub name: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            host: default_index_host(),
            port: default_index_port(),
            name: default_index_name(),
        }
    }
}

fn default_index_host() -> String {
    "localhost".into()
}
fn default_index_port() -> u16 {
    9200
}
fn default_index_name() -> String {
    "bookmarks".into()
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for one ingestion run — merged from the config file
/// and CLI flags. Immutable once the pipeline starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to the bookmark export file.
    pub location: PathBuf,
    /// Path to the dedup ledger database. `None` only when dedup is disabled.
    pub database: Option<PathBuf>,
    /// Index sink host.
    pub index_host: String,
    /// Index sink port.
    pub index_port: u16,
    /// Index name documents are written under.
    pub index_name: String,
    /// Number of parallel pool workers.
    pub pool_size: usize,
    /// User-Agent header for page fetches.
    pub user_agent: String,
    /// Per-fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Whether the persistent dedup ledger is consulted at all.
    pub dedup_enabled: bool,
    /// Directory the run report is written into.
    pub output_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.linkdex/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LinkdexError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.linkdex/linkdex.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LinkdexError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LinkdexError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LinkdexError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LinkdexError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LinkdexError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("pool_size"));
        assert!(toml_str.contains("9200"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.pool_size, 4);
        assert_eq!(parsed.defaults.fetch_timeout_secs, 10);
        assert_eq!(parsed.index.host, "localhost");
        assert_eq!(parsed.index.name, "bookmarks");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[index]
host = "search.internal"
port = 9201
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.index.host, "search.internal");
        assert_eq!(config.index.port, 9201);
        assert_eq!(config.index.name, "bookmarks");
        assert_eq!(config.defaults.pool_size, 4);
    }
}
