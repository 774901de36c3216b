//! Application configuration management.
//!
//! Resolves the config directory (CLI flag / `WG_INDICATOR_CONFIG_DIR` >
//! platform config dir) and loads `config.toml` on top of compiled-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::core::EngineOptions;
use crate::state::ConnectionCategory;

/// User-configurable settings. Missing fields use defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// UI refresh rate in milliseconds.
    pub tick_rate: u64,
    /// NetworkManager polling interval in milliseconds.
    pub poll_interval: u64,
    /// Delay between icon frames in milliseconds.
    pub frame_interval: u64,
    /// Directory holding `lock-1.svg` .. `lock-9.svg`.
    pub icons_dir: Option<PathBuf>,
    /// NetworkManager type tag of the connections to show.
    pub connection_type: String,
    /// Turn autoconnect off for every profile that gets a switch.
    pub normalize_autoconnect: bool,
    /// Path or name of the `nmcli` executable.
    pub nmcli_path: String,
    /// Minimum log level (`"debug"`, `"info"`, `"warning"`, `"error"`).
    pub log_level: String,
    /// Maximum number of log entries kept in memory.
    pub max_log_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate: constants::DEFAULT_TICK_RATE,
            poll_interval: constants::DEFAULT_POLL_INTERVAL,
            frame_interval: constants::DEFAULT_FRAME_INTERVAL,
            icons_dir: None,
            connection_type: constants::WIREGUARD_TYPE.to_string(),
            normalize_autoconnect: true,
            nmcli_path: constants::DEFAULT_NMCLI.to_string(),
            log_level: constants::DEFAULT_LOG_LEVEL.to_string(),
            max_log_entries: constants::DEFAULT_MAX_LOG_ENTRIES,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn category(&self) -> ConnectionCategory {
        ConnectionCategory::from_tag(&self.connection_type)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval.max(1))
    }

    /// Configured icon dir, else `<data dir>/wg-indicator/icons`.
    ///
    /// `None` when neither is available; the animation is skipped then.
    #[must_use]
    pub fn resolve_icons_dir(&self) -> Option<PathBuf> {
        self.icons_dir
            .clone()
            .or_else(|| {
                dirs::data_dir()
                    .map(|d| d.join(constants::APP_NAME).join(constants::ICONS_DIR_NAME))
            })
            .filter(|dir| dir.is_dir())
    }

    #[must_use]
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            category: self.category(),
            normalize_autoconnect: self.normalize_autoconnect,
            frame_interval: Duration::from_millis(self.frame_interval.max(1)),
            icons_dir: self.resolve_icons_dir(),
        }
    }
}

/// Resolves the config directory path.
///
/// Precedence: CLI flag / env var > platform config dir. The directory is not
/// created; a missing directory just means defaults.
pub fn resolve_config_dir(cli_override: Option<&PathBuf>) -> std::io::Result<PathBuf> {
    if let Some(dir) = cli_override {
        return if dir.is_relative() {
            Ok(std::env::current_dir()?.join(dir))
        } else {
            Ok(dir.clone())
        };
    }

    dirs::config_dir()
        .map(|d| d.join(constants::APP_NAME))
        .ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "Config directory not found")
        })
}

/// Loads `config.toml` from `config_dir`, or defaults if it does not exist.
pub fn load_config(config_dir: &Path) -> Result<AppConfig, String> {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(&config_path)
        .map_err(|e| format!("Failed to read {}: {e}", config_path.display()))?;

    toml::from_str(&content)
        .map_err(|e| format!("Invalid config at {}: {e}", config_path.display()))
}
