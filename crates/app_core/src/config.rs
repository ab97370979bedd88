//! Application configuration

use crate::scale::ExportScaleOption;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub loader: LoaderConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log files older than this are removed at startup
    pub log_retention_days: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_retention_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// How long to wait for the source's completion signal
    pub completion_timeout_ms: u64,
    /// Progress is reported once per this many records
    pub progress_batch: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            completion_timeout_ms: 3000,
            progress_batch: 100,
        }
    }
}

impl LoaderConfig {
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Pause after every N items (0 disables)
    pub throttle_every: usize,
    pub throttle_pause_ms: u64,
    pub default_scale_options: Vec<ExportScaleOption>,
    pub preserve_group_structure: bool,
    /// Reveal the destination in the file manager when done
    pub open_destination: bool,
    pub last_destination: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            throttle_every: 10,
            throttle_pause_ms: 50,
            default_scale_options: vec![ExportScaleOption::All],
            preserve_group_structure: false,
            open_destination: true,
            last_destination: None,
        }
    }
}

impl ExportConfig {
    pub fn throttle_pause(&self) -> Duration {
        Duration::from_millis(self.throttle_pause_ms)
    }

    /// Configured options, falling back to `All` when the list is empty
    pub fn scale_options(&self) -> Vec<ExportScaleOption> {
        if self.default_scale_options.is_empty() {
            vec![ExportScaleOption::All]
        } else {
            self.default_scale_options.clone()
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`; a missing file yields defaults
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "CarExtractor", "CarExtractor")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}
