//! Configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Download directory configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadsConfig {
    /// Directory attachments are saved into before hand-off.
    /// None = platform download directory, falling back to the temp dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// VM-opener helper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Registered native-messaging host manifest name
    #[serde(default = "default_host_name")]
    pub host_name: String,
    /// Command the helper runs against the saved file
    #[serde(default = "default_command")]
    pub command: String,
    /// Explicit helper executable path; skips the manifest lookup when set
    #[serde(default)]
    pub host_path: Option<PathBuf>,
    /// Round-trip timeout in milliseconds, 0 disables
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_host_name() -> String {
    "qubes_dvm_opener".to_string()
}

fn default_command() -> String {
    "/usr/bin/qvm-open-in-dvm".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host_name: default_host_name(),
            command: default_command(),
            host_path: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download directory configuration
    #[serde(default)]
    pub downloads: DownloadsConfig,
    /// VM-opener helper configuration
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            // Return default config if file doesn't exist
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create parent directories if needed
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "dvm-opener", "dvm-opener")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Get the default configuration embedded in the binary
    pub fn default_config_str() -> &'static str {
        include_str!("../../config/default.toml")
    }
}
