//! Collaborator seams of the reconciliation core.
//!
//! [`ConnectionSource`] is the connection manager (queries, commands and an
//! event feed); [`RenderSink`] is whatever displays the switches and the icon.
//! The core never reaches past either trait.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::error::SourceError;
use crate::state::{ActiveConnection, ActiveDevice, ConnectionProfile, ProfileKey, SwitchEntry};

/// Change notification emitted by a [`ConnectionSource`].
///
/// One event per underlying change; no batching is assumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceEvent {
    /// A profile was created.
    ConnectionAdded(ConnectionProfile),
    /// A profile was deleted.
    ConnectionRemoved(ConnectionProfile),
    /// A device appeared (a connection came up).
    DeviceAdded(ActiveDevice),
    /// A device disappeared (a connection went down).
    DeviceRemoved(ActiveDevice),
}

/// The external source of truth for profiles and devices.
///
/// Commands are fire-and-forget: `Ok` means the command was handed off, not
/// that it succeeded. Outcomes arrive later as device events.
pub trait ConnectionSource {
    fn list_profiles(&self) -> Result<Vec<ConnectionProfile>, SourceError>;
    fn list_devices(&self) -> Result<Vec<ActiveDevice>, SourceError>;
    fn list_active_connections(&self) -> Result<Vec<ActiveConnection>, SourceError>;

    fn activate(&mut self, profile: &ProfileKey) -> Result<(), SourceError>;
    fn deactivate(&mut self, connection: &ActiveConnection) -> Result<(), SourceError>;

    /// Stages an autoconnect change; nothing is persisted until [`commit`](Self::commit).
    fn set_autoconnect(&mut self, profile: &ProfileKey, enabled: bool)
        -> Result<(), SourceError>;
    /// Persists staged changes for `profile`.
    fn commit(&mut self, profile: &ProfileKey) -> Result<(), SourceError>;

    /// Starts delivering [`SourceEvent`]s into `events` until the returned
    /// [`Subscription`] is dropped.
    fn subscribe(&mut self, events: Sender<SourceEvent>) -> Result<Subscription, SourceError>;
}

/// Outward UI surface: an ordered list of switches plus one icon.
pub trait RenderSink {
    /// Inserts `entry` at `index`, or replaces the entry with the same profile.
    fn upsert(&mut self, index: usize, entry: &SwitchEntry);
    /// Drops the switch for `profile`, if shown.
    fn remove(&mut self, profile: &ProfileKey);
    /// Points the status icon at a new image.
    fn set_icon(&mut self, path: &Path);
}

/// Handle to a running event feed. Dropping it stops the feed.
#[derive(Debug)]
pub struct Subscription {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wraps a worker thread that polls `stop` between iterations.
    pub fn new(stop: Arc<AtomicBool>, worker: JoinHandle<()>) -> Self {
        Self {
            stop,
            worker: Some(worker),
        }
    }

    /// A subscription with no worker behind it.
    #[cfg(test)]
    pub fn inert() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.stop.load(Ordering::Relaxed)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        // The worker may be mid-sleep; it exits on its next wake-up.
        drop(self.worker.take());
    }
}
