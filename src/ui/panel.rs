//! Main panel: status icon, switch list and event log.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::constants;
use crate::core::ConnectionSource;
use crate::state::SwitchEntry;
use crate::theme;

/// Below this terminal height the event log is dropped.
const MIN_HEIGHT_FOR_LOG: u16 = 16;

pub fn render<S: ConnectionSource>(frame: &mut Frame, app: &mut App<S>, area: Rect) {
    let show_log = app.terminal_size.1 >= MIN_HEIGHT_FOR_LOG;
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(4),
        Constraint::Length(if show_log { 8 } else { 0 }),
    ])
    .split(area);

    render_status(frame, app, chunks[0]);
    render_switches(frame, app, chunks[1]);
    if show_log {
        render_log(frame, chunks[2]);
    }
}

/// Text rendition of the lock icon: one filled cell per frame reached.
fn frame_gauge(frame: Option<u8>) -> String {
    let filled = usize::from(frame.unwrap_or(1).min(constants::FRAME_COUNT));
    let empty = usize::from(constants::FRAME_COUNT) - filled;
    format!("{}{}", "▰".repeat(filled), "▱".repeat(empty))
}

fn render_status<S: ConnectionSource>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let active = app.view.active_count();
    let (label, color) = if active > 0 {
        (format!("SECURED ({active})"), theme::SUCCESS)
    } else {
        ("OPEN".to_string(), theme::INACTIVE)
    };
    let gauge_color = if app.engine.animator().is_animating() {
        theme::WARNING
    } else {
        color
    };

    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(frame_gauge(app.view.frame()), Style::default().fg(gauge_color)),
        Span::raw("  "),
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_DEFAULT))
        .title(Span::styled(
            format!(" {} ", app.engine.registry().category()),
            Style::default().fg(theme::ACCENT_PRIMARY),
        ));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Columns left for the label after the knob, the interface and the gaps.
fn label_width(knob: &str, interface_name: &str, width: usize) -> usize {
    width.saturating_sub(knob.chars().count() + interface_name.chars().count() + 4)
}

fn switch_item(entry: &SwitchEntry, width: usize) -> ListItem<'static> {
    let (knob, color) = if entry.toggled {
        ("[ ●]", theme::SUCCESS)
    } else {
        ("[○ ]", theme::INACTIVE)
    };
    let label_width = label_width(knob, &entry.interface_name, width);

    ListItem::new(Line::from(vec![
        Span::styled(knob, Style::default().fg(color)),
        Span::raw(" "),
        Span::styled(
            format!(
                "{:<label_width$}",
                crate::utils::truncate(&entry.label, label_width)
            ),
            Style::default().fg(theme::TEXT_PRIMARY),
        ),
        Span::raw(" "),
        Span::styled(
            entry.interface_name.clone(),
            Style::default().fg(theme::TEXT_SECONDARY),
        ),
    ]))
}

fn render_switches<S: ConnectionSource>(frame: &mut Frame, app: &mut App<S>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED))
        .title(" Connections ");

    if app.view.entries.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            constants::MSG_NO_PROFILES,
            Style::default().fg(theme::TEXT_SECONDARY),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = usize::from(area.width.saturating_sub(4));
    let items: Vec<ListItem> = app
        .view
        .entries
        .iter()
        .map(|e| switch_item(e, width))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(theme::ROW_SELECTED_BG)
                .fg(theme::ROW_SELECTED_FG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_log(frame: &mut Frame, area: Rect) {
    let rows = usize::from(area.height.saturating_sub(2));
    let lines: Vec<Line> = crate::logger::tail(rows)
        .into_iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    crate::utils::format_system_time_local(entry.timestamp),
                    Style::default().fg(theme::TEXT_SECONDARY),
                ),
                Span::raw(" "),
                Span::styled(entry.category, Style::default().fg(entry.level.color())),
                Span::raw(" "),
                Span::raw(entry.message),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_DEFAULT))
        .title(" Events ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
