//! Connection profile, device and category types.

use serde::Serialize;

use crate::constants;

/// Category tag shared by profiles and devices.
///
/// NetworkManager reports a free-form type string; only `WireGuard` is
/// reconciled, everything else is carried through as `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ConnectionCategory {
    /// `WireGuard` tunnel.
    #[default]
    WireGuard,
    /// Any other NetworkManager type (ethernet, wifi, vpn, ...).
    Other(String),
}

impl ConnectionCategory {
    /// Parses a NetworkManager type tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case(constants::WIREGUARD_TYPE) {
            Self::WireGuard
        } else {
            Self::Other(tag.to_string())
        }
    }

    /// The NetworkManager type tag for this category.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::WireGuard => constants::WIREGUARD_TYPE,
            Self::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for ConnectionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WireGuard => write!(f, "WireGuard"),
            Self::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// Stable identifier of a connection profile (the NetworkManager UUID).
///
/// Display names may collide, so every identity comparison goes through this.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProfileKey(String);

impl ProfileKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted connection definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionProfile {
    /// Stable identifier.
    pub key: ProfileKey,
    /// Display name.
    pub id: String,
    /// Interface the profile binds to when active (e.g. `wg0`).
    pub interface_name: String,
    /// Type tag.
    pub category: ConnectionCategory,
    /// Whether NetworkManager brings the profile up on boot.
    pub autoconnect: bool,
}

/// A live network interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveDevice {
    /// Interface name (e.g. `wg0`).
    pub interface_name: String,
    /// Type description.
    pub category: ConnectionCategory,
}

/// A running instance of a profile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveConnection {
    /// Key of the profile this connection instantiates.
    pub profile: ProfileKey,
    /// Display name.
    pub id: String,
    /// Interface carrying the connection; empty while still activating.
    pub device: String,
}
