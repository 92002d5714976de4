use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::watcher::watcher_handle::WatcherSettings;

/// On-disk configuration, stored as TOML under the user config directory.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PadwatchConfig {
    /// Snapshot poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Host event pump interval in milliseconds
    pub pump_interval_ms: u64,
    /// Analog stick deadzone as a fraction (0.0-1.0)
    pub joystick_deadzone: f32,
}

impl Default for PadwatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            pump_interval_ms: 10,
            joystick_deadzone: 0.05,
        }
    }
}

impl PadwatchConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                warn!("Could not determine config directory, using ./config");
                PathBuf::from("./config")
            })
            .join("padwatch")
            .join("config.toml")
    }

    /// Loads the configuration file, creating it with defaults on first run.
    pub async fn load_or_default() -> Result<Self> {
        let path = Self::config_path();

        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| eyre!("Failed to check for config file: {}", e))?
        {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| eyre!("Failed to read config file: {}", e))?;
            let config =
                toml::from_str(&content).map_err(|e| eyre!("Failed to parse config file: {}", e))?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
            }
            let content = toml::to_string_pretty(&config)
                .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;
            tokio::fs::write(&path, content)
                .await
                .map_err(|e| eyre!("Failed to write default config: {}", e))?;
            info!("Wrote default configuration to {}", path.display());
            Ok(config)
        }
    }

    pub fn watcher_settings(&self) -> WatcherSettings {
        WatcherSettings {
            poll_interval_ms: self.poll_interval_ms,
            pump_interval_ms: self.pump_interval_ms,
            joystick_deadzone: self.joystick_deadzone,
        }
    }
}
