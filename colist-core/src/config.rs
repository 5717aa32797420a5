//! YAML configuration and on-disk layout.
//!
//! # Storage layout
//!
//! ```text
//! ~/.colist/
//!   config.yaml           (optional; every field has a default)
//!   lists/<hex id>.json   (central replica, written by `colist serve`)
//!   peer/<hex id>.json    (this peer's local replica)
//! ```
//!
//! Loaders come in two forms, like everywhere else in the workspace:
//! `fn_at(home, …)` for tests and `fn(…)` deriving home from `dirs::home_dir()`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

pub const ENV_HOST: &str = "COLIST_HOST";
pub const ENV_PORT: &str = "COLIST_PORT";
pub const ENV_DATA_DIR: &str = "COLIST_DATA_DIR";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
    pub client: ClientSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageSettings {
    /// Root for both replicas; `~/.colist` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// How long a peer waits for the relay to answer a load.
    pub timeout_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self { timeout_ms: 3000 }
    }
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Settings {
    /// Resolved data directory for `home`.
    pub fn data_dir(&self, home: &Path) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(|| colist_root(home))
    }

    /// Apply `COLIST_*` overrides from `lookup` (normally the process env).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_PORT,
                value: port.clone(),
            })?;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.colist`
pub fn colist_root(home: &Path) -> PathBuf {
    home.join(".colist")
}

/// `<home>/.colist/config.yaml`
pub fn config_path(home: &Path) -> PathBuf {
    colist_root(home).join("config.yaml")
}

/// Central replica directory under a data dir.
pub fn lists_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("lists")
}

/// Local per-peer replica directory under a data dir.
pub fn peer_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("peer")
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Read `config.yaml` (defaults when absent) without env overrides.
pub fn read_at(home: &Path) -> Result<Settings, ConfigError> {
    let path = config_path(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings = serde_yaml::from_str(&contents)
        .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
    if settings.client.timeout_ms == 0 {
        return Err(ConfigError::Invalid {
            path,
            reason: "client.timeout_ms must be greater than zero".to_string(),
        });
    }
    Ok(settings)
}

/// Read `config.yaml` and apply process-env overrides.
pub fn load_at(home: &Path) -> Result<Settings, ConfigError> {
    let mut settings = read_at(home)?;
    settings.apply_overrides(|var| std::env::var(var).ok())?;
    Ok(settings)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, ConfigError> {
    load_at(&home()?)
}

pub fn to_yaml(settings: &Settings) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(settings)?)
}

/// Atomically write `config.yaml` (`.tmp` sibling + rename).
pub fn save_at(home: &Path, settings: &Settings) -> Result<PathBuf, ConfigError> {
    let root = colist_root(home);
    std::fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
    let path = config_path(home);
    let tmp = path.with_extension("yaml.tmp");
    let yaml = to_yaml(settings)?;
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
