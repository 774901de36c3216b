//! Switch registry: one toggle record per tracked profile.
//!
//! Display order is insertion order with the most recent profile first.
//! `toggled` is recomputed from the device list and never set from user input.

use crate::core::source::ConnectionSource;
use crate::state::{ActiveDevice, ConnectionCategory, ConnectionProfile, ProfileKey, SwitchEntry};
use crate::{log_debug, log_warning};

fn device_present(devices: &[ActiveDevice], interface_name: &str) -> bool {
    devices.iter().any(|d| d.interface_name == interface_name)
}

#[derive(Debug)]
pub struct SwitchRegistry {
    category: ConnectionCategory,
    entries: Vec<SwitchEntry>,
}

impl SwitchRegistry {
    #[must_use]
    pub fn new(category: ConnectionCategory) -> Self {
        Self {
            category,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn category(&self) -> &ConnectionCategory {
        &self.category
    }

    /// Entries in display order (newest first).
    #[must_use]
    pub fn entries(&self) -> &[SwitchEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, profile: &ProfileKey) -> Option<&SwitchEntry> {
        self.entries.iter().find(|e| &e.profile == profile)
    }

    /// First entry whose label equals `label`.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<&SwitchEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    #[must_use]
    pub fn any_toggled(&self) -> bool {
        self.entries.iter().any(|e| e.toggled)
    }

    /// Replaces the whole entry set from a full snapshot.
    ///
    /// Profiles are inserted front-first in order, so the result matches a
    /// series of [`add_one`](Self::add_one) calls on an empty registry.
    pub fn rebuild_all(
        &mut self,
        profiles: &[ConnectionProfile],
        devices: &[ActiveDevice],
    ) -> &[SwitchEntry] {
        self.entries.clear();
        for profile in profiles {
            self.add_one(profile, devices);
        }
        &self.entries
    }

    /// Tracks a newly reported profile at the front of the list.
    ///
    /// Returns `None` for profiles of another category. A key that is already
    /// tracked is replaced rather than duplicated.
    pub fn add_one(
        &mut self,
        profile: &ConnectionProfile,
        devices: &[ActiveDevice],
    ) -> Option<&SwitchEntry> {
        if profile.category != self.category {
            return None;
        }

        if !self.remove_for(&profile.key).is_empty() {
            log_debug!("SWITCH", "Replacing existing switch for {}", profile.id);
        }

        let toggled = device_present(devices, &profile.interface_name);
        self.entries
            .insert(0, SwitchEntry::for_profile(profile, toggled));
        self.entries.first()
    }

    /// Removes every entry referencing `profile`. Never fails.
    pub fn remove_for(&mut self, profile: &ProfileKey) -> Vec<SwitchEntry> {
        let (removed, kept) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| &e.profile == profile);
        self.entries = kept;
        removed
    }

    /// Recomputes `toggled` for every entry bound to `device`'s interface.
    ///
    /// Returns the keys of all matching entries, changed or not.
    pub fn refresh_toggle_for(
        &mut self,
        device: &ActiveDevice,
        devices: &[ActiveDevice],
    ) -> Vec<ProfileKey> {
        let present = device_present(devices, &device.interface_name);
        self.entries
            .iter_mut()
            .filter(|e| e.interface_name == device.interface_name)
            .map(|e| {
                e.toggled = present;
                e.profile.clone()
            })
            .collect()
    }

    /// Index of `profile` in display order.
    #[must_use]
    pub fn position(&self, profile: &ProfileKey) -> Option<usize> {
        self.entries.iter().position(|e| &e.profile == profile)
    }

    /// Forwards a user flip to `source` without touching `toggled`.
    ///
    /// Turning on activates the profile. Turning off deactivates every active
    /// connection of that profile, stale duplicates included. Returns the
    /// number of commands handed to the source.
    pub fn on_user_toggle(
        &self,
        profile: &ProfileKey,
        desired: bool,
        source: &mut dyn ConnectionSource,
    ) -> usize {
        let Some(entry) = self.get(profile) else {
            log_warning!("SWITCH", "Toggle for untracked profile {profile}");
            return 0;
        };

        if desired {
            return match source.activate(&entry.profile) {
                Ok(()) => 1,
                Err(e) => {
                    log_warning!("SWITCH", "Activate {} failed: {e}", entry.label);
                    0
                }
            };
        }

        let active = match source.list_active_connections() {
            Ok(active) => active,
            Err(e) => {
                log_warning!("SWITCH", "Cannot list active connections: {e}");
                return 0;
            }
        };

        let mut issued = 0;
        for connection in active.iter().filter(|c| c.profile == entry.profile) {
            match source.deactivate(connection) {
                Ok(()) => issued += 1,
                Err(e) => log_warning!("SWITCH", "Deactivate {} failed: {e}", connection.id),
            }
        }
        issued
    }

    /// Drops every entry, returning them in display order.
    pub fn clear(&mut self) -> Vec<SwitchEntry> {
        std::mem::take(&mut self.entries)
    }
}
