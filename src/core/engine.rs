//! Reconciliation engine.
//!
//! Turns connection-manager events into registry mutations and icon sweeps,
//! and user toggles into connection-manager commands. Everything here runs on
//! the main loop thread; the only inbound path from other threads is the event
//! channel handed to [`ConnectionSource::subscribe`].

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crate::core::animator::IconAnimator;
use crate::core::registry::SwitchRegistry;
use crate::core::source::{ConnectionSource, RenderSink, SourceEvent, Subscription};
use crate::core::timer::TimerQueue;
use crate::error::SourceError;
use crate::state::{ActiveDevice, ConnectionCategory, ConnectionProfile, ProfileKey};
use crate::{log_debug, log_info, log_warning};

/// Static settings for an engine instance.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Category whose profiles get switches.
    pub category: ConnectionCategory,
    /// Force autoconnect off whenever a switch is created.
    pub normalize_autoconnect: bool,
    /// Delay between icon frames.
    pub frame_interval: Duration,
    /// Where `lock-N.svg` lives; `None` disables the animation.
    pub icons_dir: Option<std::path::PathBuf>,
}

pub struct ReconciliationEngine<S: ConnectionSource> {
    source: S,
    options: EngineOptions,
    registry: SwitchRegistry,
    animator: IconAnimator,
    timers: TimerQueue,
    events: Option<Receiver<SourceEvent>>,
    subscription: Option<Subscription>,
}

impl<S: ConnectionSource> ReconciliationEngine<S> {
    pub fn new(source: S, options: EngineOptions) -> Self {
        let registry = SwitchRegistry::new(options.category.clone());
        let animator = IconAnimator::new(options.icons_dir.clone(), options.frame_interval);
        Self {
            source,
            options,
            registry,
            animator,
            timers: TimerQueue::new(),
            events: None,
            subscription: None,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SwitchRegistry {
        &self.registry
    }

    #[must_use]
    pub fn animator(&self) -> &IconAnimator {
        &self.animator
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[cfg(test)]
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Number of pending timeouts (at most one, owned by the animator).
    #[cfg(test)]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Earliest instant at which [`fire_timers`](Self::fire_timers) has work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Resets animation state, subscribes and loads the initial snapshot.
    ///
    /// The subscription comes first so that nothing changing between the two
    /// reads is lost; a change seen by both is applied twice, which is a no-op.
    pub fn enable(&mut self, sink: &mut dyn RenderSink, now: Instant) -> Result<(), SourceError> {
        self.animator.reset(&mut self.timers);
        self.animator.show_initial(sink);

        let (tx, rx) = mpsc::channel();
        let subscription = self.source.subscribe(tx)?;
        self.load(sink, now)?;

        self.subscription = Some(subscription);
        self.events = Some(rx);
        log_info!("ENGINE", "Watching {} connections", self.options.category);
        Ok(())
    }

    /// Full rebuild from a fresh snapshot ("initial load").
    pub fn load(&mut self, sink: &mut dyn RenderSink, now: Instant) -> Result<(), SourceError> {
        let profiles = self.source.list_profiles()?;
        let devices = self.source.list_devices()?;

        for stale in self.registry.clear() {
            sink.remove(&stale.profile);
        }
        let created: Vec<ProfileKey> = self
            .registry
            .rebuild_all(&profiles, &devices)
            .iter()
            .map(|e| e.profile.clone())
            .collect();

        for (index, entry) in self.registry.entries().iter().enumerate() {
            sink.upsert(index, entry);
        }
        for key in &created {
            self.normalize_autoconnect(key, &profiles);
        }
        log_info!("ENGINE", "Loaded {} switch(es)", created.len());

        let has_active = self.has_active_in(&devices);
        self.animator.trigger(has_active, &mut self.timers, now);
        Ok(())
    }

    /// Cancels the sweep, clears every switch and drops the subscription.
    pub fn disable(&mut self, sink: &mut dyn RenderSink) {
        self.animator.reset(&mut self.timers);
        self.timers.clear();
        for entry in self.registry.clear() {
            sink.remove(&entry.profile);
        }
        self.subscription = None;
        self.events = None;
        log_info!("ENGINE", "Disabled");
    }

    /// Dispatches every event queued by the subscription. Returns how many ran.
    pub fn pump(&mut self, sink: &mut dyn RenderSink, now: Instant) -> usize {
        let mut handled = 0;
        loop {
            let Some(events) = &self.events else {
                return handled;
            };
            let event = match events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return handled,
                Err(TryRecvError::Disconnected) => {
                    log_warning!("ENGINE", "Event feed closed");
                    self.events = None;
                    return handled;
                }
            };
            self.handle(event, sink, now);
            handled += 1;
        }
    }

    /// Applies a single source event.
    pub fn handle(&mut self, event: SourceEvent, sink: &mut dyn RenderSink, now: Instant) {
        match event {
            SourceEvent::ConnectionAdded(profile) => {
                if !self.category_matches(&profile.category) {
                    return;
                }
                self.on_connection_added(&profile, sink);
                let has_active = self.has_active_now();
                self.animator.trigger(has_active, &mut self.timers, now);
            }
            SourceEvent::ConnectionRemoved(profile) => {
                if !self.category_matches(&profile.category) {
                    return;
                }
                for entry in self.registry.remove_for(&profile.key) {
                    sink.remove(&entry.profile);
                }
                log_info!("ENGINE", "Profile removed: {}", profile.id);
                let has_active = self.has_active_now();
                self.animator.trigger(has_active, &mut self.timers, now);
            }
            SourceEvent::DeviceAdded(device) => {
                if !self.category_matches(&device.category) {
                    return;
                }
                self.refresh_toggles(&device, sink);
                self.animator.trigger(true, &mut self.timers, now);
            }
            SourceEvent::DeviceRemoved(device) => {
                if !self.category_matches(&device.category) {
                    return;
                }
                self.refresh_toggles(&device, sink);
                let has_active = self.has_active_now();
                self.animator.trigger(has_active, &mut self.timers, now);
            }
        }
    }

    /// Forwards a user flip to the source. The switch itself only moves once
    /// the matching device event arrives.
    pub fn toggle(&mut self, profile: &ProfileKey, desired: bool) -> usize {
        let issued = self
            .registry
            .on_user_toggle(profile, desired, &mut self.source);
        log_info!(
            "ENGINE",
            "{} {profile}: {issued} command(s)",
            if desired { "Activate" } else { "Deactivate" }
        );
        issued
    }

    /// Runs every timeout due at `now`.
    pub fn fire_timers(&mut self, sink: &mut dyn RenderSink, now: Instant) {
        for handle in self.timers.take_due(now) {
            if !self.animator.on_timer(handle, &mut self.timers, now, sink) {
                log_debug!("ENGINE", "Dropped stale timer {handle:?}");
            }
        }
    }

    fn on_connection_added(&mut self, profile: &ConnectionProfile, sink: &mut dyn RenderSink) {
        // Without a device list the switch starts off; the next device event
        // for its interface corrects it.
        let devices = self.current_devices().unwrap_or_default();
        let Some(entry) = self.registry.add_one(profile, &devices) else {
            return;
        };
        // A replaced key keeps the sink in sync by dropping the old row first.
        sink.remove(&entry.profile);
        sink.upsert(0, entry);
        log_info!("ENGINE", "Profile added: {}", profile.id);
        self.normalize_autoconnect(&profile.key, std::slice::from_ref(profile));
    }

    fn refresh_toggles(&mut self, device: &ActiveDevice, sink: &mut dyn RenderSink) {
        let Some(devices) = self.current_devices() else {
            return;
        };
        for key in self.registry.refresh_toggle_for(device, &devices) {
            if let (Some(index), Some(entry)) = (self.registry.position(&key), self.registry.get(&key))
            {
                sink.upsert(index, entry);
            }
        }
    }

    fn normalize_autoconnect(&mut self, key: &ProfileKey, profiles: &[ConnectionProfile]) {
        if !self.options.normalize_autoconnect {
            return;
        }
        let name = profiles
            .iter()
            .find(|p| &p.key == key)
            .map_or(key.as_str(), |p| p.id.as_str());

        let result = self
            .source
            .set_autoconnect(key, false)
            .and_then(|()| self.source.commit(key));
        if let Err(e) = result {
            log_warning!("ENGINE", "Could not disable autoconnect for {name}: {e}");
        }
    }

    fn category_matches(&self, category: &ConnectionCategory) -> bool {
        if category == &self.options.category {
            true
        } else {
            log_debug!("ENGINE", "Ignoring {category} event");
            false
        }
    }

    fn current_devices(&self) -> Option<Vec<ActiveDevice>> {
        match self.source.list_devices() {
            Ok(devices) => Some(devices),
            Err(e) => {
                log_warning!("ENGINE", "Cannot list devices: {e}");
                None
            }
        }
    }

    fn has_active_in(&self, devices: &[ActiveDevice]) -> bool {
        devices.iter().any(|d| d.category == self.options.category)
    }

    /// Falls back to the registry's view when the source cannot be queried.
    fn has_active_now(&self) -> bool {
        self.current_devices().map_or_else(
            || self.registry.any_toggled(),
            |devices| self.has_active_in(&devices),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::animator::frame_sequence;
    use crate::core::testing::{
        device, other_device, other_profile, profile, FakeSource, RecordingSink, SourceCall,
    };
    use std::path::PathBuf;

    const INTERVAL: Duration = Duration::from_millis(50);

    fn options() -> EngineOptions {
        EngineOptions {
            category: ConnectionCategory::WireGuard,
            normalize_autoconnect: true,
            frame_interval: INTERVAL,
            icons_dir: Some(PathBuf::from("/icons")),
        }
    }

    fn engine_with(source: FakeSource) -> ReconciliationEngine<FakeSource> {
        ReconciliationEngine::new(source, options())
    }

    /// Runs timers until the sweep settles, returning the final instant.
    fn settle(
        engine: &mut ReconciliationEngine<FakeSource>,
        sink: &mut RecordingSink,
        start: Instant,
    ) -> Instant {
        let mut now = start;
        while let Some(deadline) = engine.next_deadline() {
            now = deadline;
            engine.fire_timers(sink, now);
        }
        now
    }

    #[test]
    fn test_scenario_initial_load() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0"), profile("b", "work", "wg1")],
            devices: vec![device("wg1")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let start = Instant::now();

        engine.enable(&mut sink, start).unwrap();

        let entries = engine.registry().entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.label == "work" && e.toggled));
        assert!(entries.iter().any(|e| e.label == "home" && !e.toggled));
        assert_eq!(sink.entries, entries);
        assert_eq!(engine.animator().frames(), frame_sequence(true).as_slice());
        assert!(engine.is_enabled());

        settle(&mut engine, &mut sink, start);
        // Resting frame first, then the securing sweep.
        assert_eq!(sink.frames(), vec![1, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_initial_load_normalizes_autoconnect_once_per_switch() {
        let source = FakeSource {
            profiles: vec![
                profile("a", "home", "wg0"),
                other_profile("eth", "Wired", "eth0"),
            ],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        engine.enable(&mut sink, now).unwrap();
        engine.handle(SourceEvent::DeviceAdded(device("wg0")), &mut sink, now);

        assert_eq!(
            engine.source().calls,
            vec![
                SourceCall::SetAutoconnect(ProfileKey::new("a"), false),
                SourceCall::Commit(ProfileKey::new("a")),
            ]
        );
    }

    #[test]
    fn test_normalization_can_be_disabled() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0")],
            ..FakeSource::default()
        };
        let mut engine = ReconciliationEngine::new(
            source,
            EngineOptions {
                normalize_autoconnect: false,
                ..options()
            },
        );
        let mut sink = RecordingSink::default();

        engine.load(&mut sink, Instant::now()).unwrap();

        assert!(engine.source().calls.is_empty());
    }

    #[test]
    fn test_scenario_user_toggle_on() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        engine.load(&mut sink, Instant::now()).unwrap();
        engine.source_mut().calls.clear();
        let before = engine.registry().entries().to_vec();

        let issued = engine.toggle(&ProfileKey::new("a"), true);

        assert_eq!(issued, 1);
        assert_eq!(
            engine.source().calls,
            vec![SourceCall::Activate(ProfileKey::new("a"))]
        );
        assert_eq!(engine.registry().entries(), before.as_slice());
    }

    #[test]
    fn test_scenario_remove_last_active_profile() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0"), profile("b", "work", "wg1")],
            devices: vec![device("wg0")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let start = Instant::now();
        engine.load(&mut sink, start).unwrap();
        let now = settle(&mut engine, &mut sink, start);

        engine.source_mut().devices.clear();
        let removed = profile("a", "home", "wg0");
        engine.handle(SourceEvent::ConnectionRemoved(removed), &mut sink, now);

        assert_eq!(engine.registry().len(), 1);
        assert!(engine.registry().get(&ProfileKey::new("a")).is_none());
        assert_eq!(sink.entries.len(), 1);
        assert_eq!(engine.animator().frames(), frame_sequence(false).as_slice());

        let shown = sink.icons.len();
        settle(&mut engine, &mut sink, now);
        assert_eq!(&sink.frames()[shown..], &[9, 8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_scenario_device_removed_shared_interface() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0"), profile("b", "home-alt", "wg0")],
            devices: vec![device("wg0")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let now = Instant::now();
        engine.load(&mut sink, now).unwrap();
        assert!(engine.registry().entries().iter().all(|e| e.toggled));

        engine.source_mut().devices.clear();
        engine.handle(SourceEvent::DeviceRemoved(device("wg0")), &mut sink, now);

        assert!(engine.registry().entries().iter().all(|e| !e.toggled));
        assert!(sink.entries.iter().all(|e| !e.toggled));
    }

    #[test]
    fn test_connection_added_goes_to_front_and_normalizes() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let now = Instant::now();
        engine.load(&mut sink, now).unwrap();
        engine.source_mut().calls.clear();

        engine.handle(
            SourceEvent::ConnectionAdded(profile("c", "cafe", "wg5")),
            &mut sink,
            now,
        );

        assert_eq!(engine.registry().entries()[0].label, "cafe");
        assert_eq!(sink.entries[0].label, "cafe");
        assert_eq!(
            engine.source().calls,
            vec![
                SourceCall::SetAutoconnect(ProfileKey::new("c"), false),
                SourceCall::Commit(ProfileKey::new("c")),
            ]
        );
    }

    #[test]
    fn test_other_category_events_are_ignored() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0")],
            devices: vec![device("wg0")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let now = Instant::now();
        engine.load(&mut sink, now).unwrap();
        let entries_before = engine.registry().entries().to_vec();
        let sink_before = sink.entries.clone();
        let timers_before = engine.pending_timers();
        let frames_before = engine.animator().frames().to_vec();
        let deadline_before = engine.next_deadline();

        engine.handle(
            SourceEvent::ConnectionAdded(other_profile("eth", "Wired", "eth0")),
            &mut sink,
            now,
        );
        engine.handle(SourceEvent::DeviceAdded(other_device("eth0")), &mut sink, now);
        // Same key and interface as the tracked profile, foreign category.
        engine.handle(
            SourceEvent::ConnectionRemoved(other_profile("a", "home", "wg0")),
            &mut sink,
            now,
        );
        engine.handle(SourceEvent::DeviceRemoved(other_device("wg0")), &mut sink, now);

        assert_eq!(engine.registry().entries(), entries_before.as_slice());
        assert_eq!(sink.entries, sink_before);
        assert!(engine.registry().entries()[0].toggled);
        assert_eq!(engine.pending_timers(), timers_before);
        assert_eq!(engine.next_deadline(), deadline_before);
        assert_eq!(engine.animator().frames(), frames_before.as_slice());
    }

    #[test]
    fn test_connection_added_during_query_failure_still_gets_switch() {
        let mut engine = engine_with(FakeSource::default());
        let mut sink = RecordingSink::default();
        let now = Instant::now();
        engine.load(&mut sink, now).unwrap();
        engine.source_mut().fail_queries = true;

        engine.handle(
            SourceEvent::ConnectionAdded(profile("n", "new", "wg3")),
            &mut sink,
            now,
        );

        assert_eq!(engine.registry().len(), 1);
        assert!(!engine.registry().entries()[0].toggled);
        assert_eq!(sink.entries.len(), 1);

        engine.source_mut().fail_queries = false;
        engine.source_mut().devices = vec![device("wg3")];
        engine.handle(SourceEvent::DeviceAdded(device("wg3")), &mut sink, now);
        assert!(sink.entries[0].toggled);
    }

    #[test]
    fn test_enable_sees_change_landing_during_subscribe() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0")],
            devices_after_subscribe: Some(vec![device("wg0")]),
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        engine.enable(&mut sink, Instant::now()).unwrap();

        // The watcher baseline already holds wg0, so no event will follow.
        assert_eq!(engine.pump(&mut sink, Instant::now()), 0);
        assert!(engine.registry().entries()[0].toggled);
        assert!(sink.entries[0].toggled);
    }

    #[test]
    fn test_device_added_triggers_securing_sweep() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let start = Instant::now();
        engine.load(&mut sink, start).unwrap();
        assert_eq!(engine.animator().frames(), frame_sequence(false).as_slice());

        engine.source_mut().devices.push(device("wg0"));
        engine.handle(SourceEvent::DeviceAdded(device("wg0")), &mut sink, start);

        assert!(engine.registry().entries()[0].toggled);
        assert_eq!(engine.animator().frames(), frame_sequence(true).as_slice());
        assert_eq!(engine.pending_timers(), 1);
    }

    #[test]
    fn test_rapid_events_keep_one_timer() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let start = Instant::now();
        engine.load(&mut sink, start).unwrap();

        for i in 0..5 {
            let now = start + Duration::from_millis(i * 10);
            engine.handle(SourceEvent::DeviceAdded(device("wg0")), &mut sink, now);
            engine.fire_timers(&mut sink, now);
            assert_eq!(engine.pending_timers(), 1);
        }
    }

    #[test]
    fn test_pump_drains_subscription_channel() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let now = Instant::now();
        engine.enable(&mut sink, now).unwrap();

        let tx = engine.source().subscriber.clone().unwrap();
        tx.send(SourceEvent::ConnectionAdded(profile("b", "work", "wg1")))
            .unwrap();
        tx.send(SourceEvent::ConnectionRemoved(profile("a", "home", "wg0")))
            .unwrap();

        assert_eq!(engine.pump(&mut sink, now), 2);
        assert_eq!(engine.pump(&mut sink, now), 0);
        let labels: Vec<&str> = sink.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["work"]);
    }

    #[test]
    fn test_disable_cancels_timer_and_clears_switches() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0")],
            devices: vec![device("wg0")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        engine.enable(&mut sink, Instant::now()).unwrap();
        assert_eq!(engine.pending_timers(), 1);

        engine.disable(&mut sink);

        assert_eq!(engine.pending_timers(), 0);
        assert!(!engine.animator().is_animating());
        assert!(engine.registry().is_empty());
        assert!(sink.entries.is_empty());
        assert!(!engine.is_enabled());
        assert_eq!(engine.pump(&mut sink, Instant::now()), 0);
    }

    #[test]
    fn test_enable_twice_does_not_duplicate() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0"), profile("b", "work", "wg1")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        engine.enable(&mut sink, now).unwrap();
        engine.enable(&mut sink, now).unwrap();

        assert_eq!(engine.registry().len(), 2);
        assert_eq!(sink.entries.len(), 2);
        assert_eq!(engine.pending_timers(), 1);
    }

    #[test]
    fn test_load_propagates_query_failure() {
        let source = FakeSource {
            fail_queries: true,
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();

        assert!(engine.load(&mut sink, Instant::now()).is_err());
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn test_device_event_survives_query_failure() {
        let source = FakeSource {
            profiles: vec![profile("a", "home", "wg0")],
            devices: vec![device("wg0")],
            ..FakeSource::default()
        };
        let mut engine = engine_with(source);
        let mut sink = RecordingSink::default();
        let now = Instant::now();
        engine.load(&mut sink, now).unwrap();

        engine.source_mut().fail_queries = true;
        engine.handle(SourceEvent::DeviceRemoved(device("wg0")), &mut sink, now);

        // No fresh device list: the switch keeps its last known state and the
        // sweep falls back to the registry's view.
        assert!(engine.registry().entries()[0].toggled);
        assert_eq!(engine.animator().frames(), frame_sequence(true).as_slice());
    }
}
