//! Render-side mirror of the switch list and status icon.

use std::path::{Path, PathBuf};

use crate::core::animator::frame_from_path;
use crate::core::RenderSink;
use crate::state::{ProfileKey, SwitchEntry};

/// What the panel draws. Only the engine writes to it, through [`RenderSink`].
#[derive(Debug, Default)]
pub struct PanelView {
    pub entries: Vec<SwitchEntry>,
    pub icon: Option<PathBuf>,
}

impl PanelView {
    /// Frame number of the icon currently shown.
    #[must_use]
    pub fn frame(&self) -> Option<u8> {
        self.icon.as_deref().and_then(frame_from_path)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.toggled).count()
    }
}

impl RenderSink for PanelView {
    fn upsert(&mut self, index: usize, entry: &SwitchEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.profile == entry.profile) {
            existing.clone_from(entry);
        } else {
            let index = index.min(self.entries.len());
            self.entries.insert(index, entry.clone());
        }
    }

    fn remove(&mut self, profile: &ProfileKey) {
        self.entries.retain(|e| &e.profile != profile);
    }

    fn set_icon(&mut self, path: &Path) {
        self.icon = Some(path.to_path_buf());
    }
}
