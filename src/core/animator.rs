//! Status icon sweep animation.
//!
//! A sweep walks the nine lock frames forward ("securing") when a tunnel is up
//! and backward ("releasing") when none is. Each frame is a one-shot timeout
//! that schedules the next; the animator owns at most one pending timeout.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::constants;
use crate::core::source::RenderSink;
use crate::core::timer::{TimerHandle, TimerQueue};
use crate::{log_debug, log_warning};

/// Frame order for one sweep: `1..=9` when securing, `9..=1` when releasing.
#[must_use]
pub fn frame_sequence(has_active_connections: bool) -> Vec<u8> {
    if has_active_connections {
        (1..=constants::FRAME_COUNT).collect()
    } else {
        (1..=constants::FRAME_COUNT).rev().collect()
    }
}

/// Icon file for `frame` inside `icons_dir`.
#[must_use]
pub fn frame_path(icons_dir: &Path, frame: u8) -> PathBuf {
    icons_dir.join(format!(
        "{}{frame}.{}",
        constants::ICON_PREFIX,
        constants::ICON_EXTENSION
    ))
}

/// Frame number encoded in an icon path, if it is one of ours.
#[must_use]
pub fn frame_from_path(path: &Path) -> Option<u8> {
    path.file_stem()?
        .to_str()?
        .strip_prefix(constants::ICON_PREFIX)?
        .parse()
        .ok()
}

#[derive(Debug)]
pub struct IconAnimator {
    icons_dir: Option<PathBuf>,
    interval: Duration,
    timer: Option<TimerHandle>,
    frame_index: usize,
    frames: Vec<u8>,
}

impl IconAnimator {
    /// `icons_dir` is `None` when the asset location cannot be resolved; the
    /// animator then stays idle.
    #[must_use]
    pub fn new(icons_dir: Option<PathBuf>, interval: Duration) -> Self {
        Self {
            icons_dir,
            interval,
            timer: None,
            frame_index: 0,
            frames: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.timer.is_some()
    }

    /// Frames of the current (or last) sweep.
    #[must_use]
    pub fn frames(&self) -> &[u8] {
        &self.frames
    }

    #[must_use]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Shows the resting "unlocked" frame.
    pub fn show_initial(&self, sink: &mut dyn RenderSink) {
        if let Some(dir) = &self.icons_dir {
            sink.set_icon(&frame_path(dir, 1));
        }
    }

    /// Starts a new sweep, replacing any sweep still in flight.
    pub fn trigger(&mut self, has_active_connections: bool, timers: &mut TimerQueue, now: Instant) {
        if self.icons_dir.is_none() {
            log_warning!("ICON", "{}", constants::MSG_MISSING_ICONS);
            return;
        }

        self.cancel(timers);
        self.frames = frame_sequence(has_active_connections);
        self.frame_index = 0;
        self.timer = Some(timers.schedule(now, self.interval));
        log_debug!(
            "ICON",
            "Sweep {}",
            if has_active_connections { "securing" } else { "releasing" }
        );
    }

    /// Advances the sweep if `handle` is the animator's pending timeout.
    ///
    /// Returns `false` for handles that are not ours (already replaced).
    pub fn on_timer(
        &mut self,
        handle: TimerHandle,
        timers: &mut TimerQueue,
        now: Instant,
        sink: &mut dyn RenderSink,
    ) -> bool {
        if self.timer != Some(handle) {
            return false;
        }
        self.timer = None;

        let (Some(dir), Some(&frame)) = (&self.icons_dir, self.frames.get(self.frame_index))
        else {
            return true;
        };

        sink.set_icon(&frame_path(dir, frame));
        self.frame_index += 1;

        if self.frame_index < self.frames.len() {
            self.timer = Some(timers.schedule(now, self.interval));
        }
        true
    }

    /// Drops the pending timeout, if any.
    pub fn cancel(&mut self, timers: &mut TimerQueue) {
        if let Some(handle) = self.timer.take() {
            timers.cancel(handle);
        }
    }

    /// Cancels and forgets the current sweep.
    pub fn reset(&mut self, timers: &mut TimerQueue) {
        self.cancel(timers);
        self.frame_index = 0;
        self.frames.clear();
    }
}
