//! Application configuration loaded from TOML

use anyhow::Context;
use pickapart_pricing::PricingConfig;
use pickapart_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) sync: SyncConfig,
    pub(crate) pricing: PricingConfig,
    pub(crate) log: LogConfig,
    pub(crate) paths: PathsConfig,
}

/// `[log]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub(crate) filter: String,
    /// Emit JSON lines instead of text
    pub(crate) json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            json: false,
        }
    }
}

/// `[paths]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PathsConfig {
    /// Directory holding the session cache file
    pub(crate) cache_dir: PathBuf,
    /// JSON file standing in for the server store
    pub(crate) store_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".pickapart/session"),
            store_file: PathBuf::from(".pickapart/store.json"),
        }
    }
}

impl AppConfig {
    /// Load from `path`; a missing file yields defaults
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read config {}", path.display()))
            }
        };

        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}
