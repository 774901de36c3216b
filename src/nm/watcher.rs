//! Snapshot polling that turns NetworkManager state into source events.
//!
//! `nmcli` has no change feed short of `nmcli monitor`'s free-text output, so
//! the watcher captures profiles and devices periodically and diffs
//! consecutive snapshots.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::NmcliQuery;
use crate::core::{SourceEvent, Subscription};
use crate::error::SourceError;
use crate::state::{ActiveDevice, ConnectionProfile, ProfileKey};
use crate::{log_debug, log_warning};

/// Point-in-time view of profiles and devices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub profiles: Vec<ConnectionProfile>,
    pub devices: Vec<ActiveDevice>,
}

impl Snapshot {
    pub fn capture(query: &NmcliQuery) -> Result<Self, SourceError> {
        Ok(Self {
            profiles: query.profiles()?,
            devices: query.devices()?,
        })
    }
}

/// Profiles whose identity-relevant fields differ are reported as replaced.
fn same_profile(a: &ConnectionProfile, b: &ConnectionProfile) -> bool {
    a.id == b.id && a.interface_name == b.interface_name && a.category == b.category
}

/// Events that take `prev` to `next`.
///
/// Order: removed connections, added connections, removed devices, added
/// devices. Profiles are matched by key, devices by interface name.
#[must_use]
pub fn diff(prev: &Snapshot, next: &Snapshot) -> Vec<SourceEvent> {
    let mut events = Vec::new();

    let prev_profiles: HashMap<&ProfileKey, &ConnectionProfile> =
        prev.profiles.iter().map(|p| (&p.key, p)).collect();
    let next_profiles: HashMap<&ProfileKey, &ConnectionProfile> =
        next.profiles.iter().map(|p| (&p.key, p)).collect();

    for old in &prev.profiles {
        match next_profiles.get(&old.key) {
            Some(new) if same_profile(old, new) => {}
            _ => events.push(SourceEvent::ConnectionRemoved(old.clone())),
        }
    }
    for new in &next.profiles {
        match prev_profiles.get(&new.key) {
            Some(old) if same_profile(old, new) => {}
            _ => events.push(SourceEvent::ConnectionAdded(new.clone())),
        }
    }

    let prev_devices: HashSet<&str> = prev
        .devices
        .iter()
        .map(|d| d.interface_name.as_str())
        .collect();
    let next_devices: HashSet<&str> = next
        .devices
        .iter()
        .map(|d| d.interface_name.as_str())
        .collect();

    events.extend(
        prev.devices
            .iter()
            .filter(|d| !next_devices.contains(d.interface_name.as_str()))
            .map(|d| SourceEvent::DeviceRemoved(d.clone())),
    );
    events.extend(
        next.devices
            .iter()
            .filter(|d| !prev_devices.contains(d.interface_name.as_str()))
            .map(|d| SourceEvent::DeviceAdded(d.clone())),
    );

    events
}

/// Spawns the polling thread. `baseline` is the state the caller already knows.
pub fn spawn(
    query: NmcliQuery,
    baseline: Snapshot,
    interval: Duration,
    events: Sender<SourceEvent>,
) -> Result<Subscription, SourceError> {
    let stop = Arc::new(AtomicBool::new(false));
    let worker_stop = Arc::clone(&stop);

    let spawned = thread::Builder::new().name("nm-watcher".into()).spawn(move || {
        let mut prev = baseline;
        loop {
            thread::sleep(interval);
            if worker_stop.load(Ordering::Relaxed) {
                return;
            }

            let next = match Snapshot::capture(&query) {
                Ok(next) => next,
                Err(e) => {
                    log_warning!("NM", "Snapshot failed: {e}");
                    continue;
                }
            };

            for event in diff(&prev, &next) {
                log_debug!("NM", "{event:?}");
                if events.send(event).is_err() {
                    return;
                }
            }
            prev = next;
        }
    });

    let worker = spawned.map_err(|e| SourceError::Subscription {
        message: e.to_string(),
    })?;
    Ok(Subscription::new(stop, worker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{device, profile};

    fn snapshot(profiles: Vec<ConnectionProfile>, devices: Vec<ActiveDevice>) -> Snapshot {
        Snapshot { profiles, devices }
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let snap = snapshot(vec![profile("a", "home", "wg0")], vec![device("wg0")]);
        assert!(diff(&snap, &snap.clone()).is_empty());
    }

    #[test]
    fn test_diff_added_and_removed_profiles() {
        let prev = snapshot(vec![profile("a", "home", "wg0")], vec![]);
        let next = snapshot(vec![profile("b", "work", "wg1")], vec![]);

        assert_eq!(
            diff(&prev, &next),
            vec![
                SourceEvent::ConnectionRemoved(profile("a", "home", "wg0")),
                SourceEvent::ConnectionAdded(profile("b", "work", "wg1")),
            ]
        );
    }

    #[test]
    fn test_diff_device_up_and_down() {
        let prev = snapshot(vec![], vec![device("wg0")]);
        let next = snapshot(vec![], vec![device("wg1")]);

        assert_eq!(
            diff(&prev, &next),
            vec![
                SourceEvent::DeviceRemoved(device("wg0")),
                SourceEvent::DeviceAdded(device("wg1")),
            ]
        );
    }

    #[test]
    fn test_diff_renamed_profile_is_replaced() {
        let prev = snapshot(vec![profile("a", "home", "wg0")], vec![]);
        let next = snapshot(vec![profile("a", "home", "wg7")], vec![]);

        let events = diff(&prev, &next);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], SourceEvent::ConnectionRemoved(p) if p.interface_name == "wg0"));
        assert!(matches!(&events[1], SourceEvent::ConnectionAdded(p) if p.interface_name == "wg7"));
    }

    #[test]
    fn test_diff_ignores_autoconnect_flip() {
        let prev = snapshot(vec![profile("a", "home", "wg0")], vec![]);
        let mut flipped = profile("a", "home", "wg0");
        flipped.autoconnect = false;
        let next = snapshot(vec![flipped], vec![]);

        assert!(diff(&prev, &next).is_empty());
    }
}
