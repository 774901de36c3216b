//! Application-wide constants and configuration values.
//!
//! Timing intervals, icon naming, NetworkManager vocabulary and the
//! default values backing `config.toml`.

use std::time::Duration;

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// === Timing Configuration ===

/// UI refresh rate in milliseconds.
pub const DEFAULT_TICK_RATE: u64 = 250;
/// Interval between NetworkManager snapshots in milliseconds.
pub const DEFAULT_POLL_INTERVAL: u64 = 1000;
/// Delay between two icon frames in milliseconds.
pub const DEFAULT_FRAME_INTERVAL: u64 = 50;
/// Upper bound on how long the main loop blocks before draining source events.
pub const EVENT_DRAIN_INTERVAL: Duration = Duration::from_millis(100);

// === Icon Animation ===

/// Number of frames in one sweep.
pub const FRAME_COUNT: u8 = 9;
/// Icon file name prefix; frame `n` lives at `lock-<n>.svg`.
pub const ICON_PREFIX: &str = "lock-";
/// Icon file extension.
pub const ICON_EXTENSION: &str = "svg";
/// Name of the icons subdirectory under the data dir.
pub const ICONS_DIR_NAME: &str = "icons";

// === NetworkManager ===

/// Type tag NetworkManager uses for WireGuard connections and devices.
pub const WIREGUARD_TYPE: &str = "wireguard";
/// Default `nmcli` executable.
pub const DEFAULT_NMCLI: &str = "nmcli";

// === Config / Logging Defaults ===

/// Name of the configuration file inside the config dir.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable overriding the config dir.
pub const CONFIG_DIR_ENV: &str = "WG_INDICATOR_CONFIG_DIR";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Maximum number of log entries kept in memory.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 500;

// === Messages ===

pub const MSG_NO_PROFILES: &str = "No WireGuard profiles found";
pub const MSG_MISSING_ICONS: &str = "icon directory unavailable, skipping animation";
pub const CLI_MSG_ERROR: &str = "Error: ";
pub const CLI_MSG_UNKNOWN_PROFILE: &str = "No WireGuard profile named ";
pub const CLI_MSG_TIMEOUT: &str = "Timed out waiting for NetworkManager";

// === CLI ===

/// How long `up`/`down` wait for the device event.
pub const CLI_WAIT_TIMEOUT: Duration = Duration::from_secs(20);
