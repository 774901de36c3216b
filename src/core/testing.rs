//! In-memory collaborators for unit tests.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use crate::core::source::{ConnectionSource, RenderSink, SourceEvent, Subscription};
use crate::error::SourceError;
use crate::state::{
    ActiveConnection, ActiveDevice, ConnectionCategory, ConnectionProfile, ProfileKey,
    SwitchEntry,
};

pub fn profile(key: &str, id: &str, iface: &str) -> ConnectionProfile {
    ConnectionProfile {
        key: ProfileKey::new(key),
        id: id.to_string(),
        interface_name: iface.to_string(),
        category: ConnectionCategory::WireGuard,
        autoconnect: true,
    }
}

pub fn other_profile(key: &str, id: &str, iface: &str) -> ConnectionProfile {
    ConnectionProfile {
        category: ConnectionCategory::Other("802-3-ethernet".to_string()),
        ..profile(key, id, iface)
    }
}

pub fn device(iface: &str) -> ActiveDevice {
    ActiveDevice {
        interface_name: iface.to_string(),
        category: ConnectionCategory::WireGuard,
    }
}

pub fn other_device(iface: &str) -> ActiveDevice {
    ActiveDevice {
        interface_name: iface.to_string(),
        category: ConnectionCategory::Other("ethernet".to_string()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceCall {
    Activate(ProfileKey),
    Deactivate(ActiveConnection),
    SetAutoconnect(ProfileKey, bool),
    Commit(ProfileKey),
}

/// Records commands; queries return whatever the test put in.
#[derive(Default)]
pub struct FakeSource {
    pub profiles: Vec<ConnectionProfile>,
    pub devices: Vec<ActiveDevice>,
    pub active: Vec<ActiveConnection>,
    pub calls: Vec<SourceCall>,
    pub subscriber: Option<Sender<SourceEvent>>,
    pub fail_queries: bool,
    /// Replaces `devices` when `subscribe` runs, as if the watcher's
    /// baseline captured a newer state than any earlier read.
    pub devices_after_subscribe: Option<Vec<ActiveDevice>>,
}

impl FakeSource {
    fn check(&self) -> Result<(), SourceError> {
        if self.fail_queries {
            Err(SourceError::CommandFailed {
                program: "fake".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl ConnectionSource for FakeSource {
    fn list_profiles(&self) -> Result<Vec<ConnectionProfile>, SourceError> {
        self.check()?;
        Ok(self.profiles.clone())
    }

    fn list_devices(&self) -> Result<Vec<ActiveDevice>, SourceError> {
        self.check()?;
        Ok(self.devices.clone())
    }

    fn list_active_connections(&self) -> Result<Vec<ActiveConnection>, SourceError> {
        self.check()?;
        Ok(self.active.clone())
    }

    fn activate(&mut self, profile: &ProfileKey) -> Result<(), SourceError> {
        self.calls.push(SourceCall::Activate(profile.clone()));
        Ok(())
    }

    fn deactivate(&mut self, connection: &ActiveConnection) -> Result<(), SourceError> {
        self.calls.push(SourceCall::Deactivate(connection.clone()));
        Ok(())
    }

    fn set_autoconnect(&mut self, profile: &ProfileKey, enabled: bool) -> Result<(), SourceError> {
        self.calls
            .push(SourceCall::SetAutoconnect(profile.clone(), enabled));
        Ok(())
    }

    fn commit(&mut self, profile: &ProfileKey) -> Result<(), SourceError> {
        self.calls.push(SourceCall::Commit(profile.clone()));
        Ok(())
    }

    fn subscribe(&mut self, events: Sender<SourceEvent>) -> Result<Subscription, SourceError> {
        self.subscriber = Some(events);
        if let Some(devices) = self.devices_after_subscribe.take() {
            self.devices = devices;
        }
        Ok(Subscription::inert())
    }
}

/// Mirrors what a real panel would show.
#[derive(Default, Debug)]
pub struct RecordingSink {
    pub entries: Vec<SwitchEntry>,
    pub icons: Vec<PathBuf>,
}

impl RecordingSink {
    /// Frame numbers shown so far, parsed back out of the icon paths.
    pub fn frames(&self) -> Vec<u8> {
        self.icons
            .iter()
            .filter_map(|p| crate::core::animator::frame_from_path(p))
            .collect()
    }
}

impl RenderSink for RecordingSink {
    fn upsert(&mut self, index: usize, entry: &SwitchEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.profile == entry.profile) {
            *existing = entry.clone();
        } else {
            let index = index.min(self.entries.len());
            self.entries.insert(index, entry.clone());
        }
    }

    fn remove(&mut self, profile: &ProfileKey) {
        self.entries.retain(|e| &e.profile != profile);
    }

    fn set_icon(&mut self, path: &Path) {
        self.icons.push(path.to_path_buf());
    }
}
