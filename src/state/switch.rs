//! Toggle-control records derived from connection profiles.

use serde::Serialize;

use super::{ConnectionProfile, ProfileKey};

/// One toggle in the panel, derived from a [`ConnectionProfile`].
///
/// `toggled` mirrors device presence and is never authoritative; a user flip
/// issues a command and waits for the device event to come back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SwitchEntry {
    /// Back-reference to the originating profile, used for identity only.
    pub profile: ProfileKey,
    /// Label shown next to the switch (the profile's display name).
    pub label: String,
    /// Interface the profile binds to.
    pub interface_name: String,
    /// Whether a device with `interface_name` currently exists.
    pub toggled: bool,
}

impl SwitchEntry {
    pub(crate) fn for_profile(profile: &ConnectionProfile, toggled: bool) -> Self {
        Self {
            profile: profile.key.clone(),
            label: profile.id.clone(),
            interface_name: profile.interface_name.clone(),
            toggled,
        }
    }
}
