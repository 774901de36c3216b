//! UI rendering module

mod panel;
pub mod view;
mod widgets;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::app::App;
use crate::core::ConnectionSource;

/// Main render function
pub fn render<S: ConnectionSource>(frame: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(frame.area());

    panel::render(frame, app, chunks[0]);
    widgets::footer::render_panel(frame, !app.view.entries.is_empty(), chunks[1]);
}
