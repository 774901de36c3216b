//! Single-threaded deadline queue.
//!
//! Stands in for the host loop's one-shot timeouts: the main loop asks for the
//! next deadline, sleeps until then, and fires whatever is due. Callers pass
//! `now` explicitly so the queue stays deterministic under test.

use std::time::{Duration, Instant};

/// Opaque id of a scheduled one-shot timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: Vec<(TimerHandle, Instant)>,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a one-shot timeout `delay` after `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push((handle, now + delay));
        handle
    }

    /// Removes a pending timeout. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(h, _)| *h != handle);
        self.pending.len() != before
    }

    #[cfg(test)]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|(h, _)| *h == handle)
    }

    /// Number of pending timeouts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(_, at)| *at).min()
    }

    /// Removes and returns every timeout due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerHandle> {
        let mut due: Vec<(TimerHandle, Instant)> = Vec::new();
        self.pending.retain(|&(handle, at)| {
            if at <= now {
                due.push((handle, at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(_, at)| at);
        due.into_iter().map(|(handle, _)| handle).collect()
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
