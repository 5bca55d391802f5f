//! CLI configuration loading and management.

use attesta_core::PlatformConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Full configuration for the `attesta` binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AttestaConfig {
    /// Fees, sealing mode and KDF cost.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the RocksDB data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./attesta-data")
}
fn default_log_level() -> String {
    "warn".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AttestaConfig {
    /// Load config from a TOML file, falling back to defaults for a missing
    /// file or missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: AttestaConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format.eq_ignore_ascii_case("json")
    }
}
