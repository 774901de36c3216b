//! Panel application state and input handling.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use crate::constants;
use crate::core::{ConnectionSource, EngineOptions, ReconciliationEngine};
use crate::error::SourceError;
use crate::state::SwitchEntry;
use crate::ui::view::PanelView;
use crate::{log_info, log_warning};

pub struct App<S: ConnectionSource> {
    pub should_quit: bool,
    pub engine: ReconciliationEngine<S>,
    pub view: PanelView,
    pub list_state: ListState,
    pub terminal_size: (u16, u16),
}

impl<S: ConnectionSource> App<S> {
    pub fn new(source: S, options: EngineOptions) -> Self {
        Self {
            should_quit: false,
            engine: ReconciliationEngine::new(source, options),
            view: PanelView::default(),
            list_state: ListState::default(),
            terminal_size: (0, 0),
        }
    }

    /// Initial load plus subscription.
    pub fn start(&mut self) -> Result<(), SourceError> {
        log_info!(
            "APP",
            "{} v{} starting",
            constants::APP_NAME,
            constants::APP_VERSION
        );
        self.engine.enable(&mut self.view, Instant::now())?;
        if self.view.entries.is_empty() {
            log_info!("APP", "{}", constants::MSG_NO_PROFILES);
        }
        self.clamp_selection();
        Ok(())
    }

    /// Tears the engine down; safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.engine.is_enabled() {
            self.engine.disable(&mut self.view);
        }
    }

    /// Drains connection events and fires due animation frames.
    pub fn service(&mut self, now: Instant) {
        self.engine.pump(&mut self.view, now);
        self.engine.fire_timers(&mut self.view, now);
        self.clamp_selection();
    }

    /// How long the main loop may block before [`service`](Self::service) has work.
    #[must_use]
    pub fn next_wait(&self, now: Instant) -> Duration {
        self.engine
            .next_deadline()
            .map_or(constants::EVENT_DRAIN_INTERVAL, |deadline| {
                deadline
                    .saturating_duration_since(now)
                    .min(constants::EVENT_DRAIN_INTERVAL)
            })
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
    }

    #[must_use]
    pub fn selected_entry(&self) -> Option<&SwitchEntry> {
        self.list_state
            .selected()
            .and_then(|i| self.view.entries.get(i))
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
            || key.code == KeyCode::Char('q')
            || key.code == KeyCode::Esc
        {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Home | KeyCode::Char('g') => self.select_index(0),
            KeyCode::End | KeyCode::Char('G') => {
                self.select_index(self.view.entries.len().saturating_sub(1));
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('c') => crate::logger::clear_logs(),
            _ => {}
        }
    }

    fn toggle_selected(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let profile = entry.profile.clone();
        let desired = !entry.toggled;
        self.engine.toggle(&profile, desired);
    }

    fn reload(&mut self) {
        log_info!("APP", "Reloading");
        self.engine.disable(&mut self.view);
        if let Err(e) = self.engine.enable(&mut self.view, Instant::now()) {
            log_warning!("APP", "Reload failed: {e}");
        }
        self.clamp_selection();
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.view.entries.len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.list_state.select(Some(next));
    }

    fn select_index(&mut self, index: usize) {
        if self.view.entries.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state
                .select(Some(index.min(self.view.entries.len() - 1)));
        }
    }

    fn clamp_selection(&mut self) {
        match (self.list_state.selected(), self.view.entries.len()) {
            (_, 0) => self.list_state.select(None),
            (None, _) => self.list_state.select(Some(0)),
            (Some(i), len) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }
}
