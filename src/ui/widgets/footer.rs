//! Footer widget with keybinding hints

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme;

/// Render the panel footer; selection hints only appear when there is a list.
pub fn render_panel(frame: &mut Frame, has_entries: bool, area: Rect) {
    let mut hints = Vec::new();

    if has_entries {
        hints.extend_from_slice(&[("↑↓", "Select"), ("Space", "Toggle")]);
    }

    hints.extend_from_slice(&[("r", "Reload"), ("c", "Clear log"), ("q", "Quit")]);

    render_hints(frame, area, &hints);
}

/// Hint spans that fit in `max_width`, dropping from the right.
fn hint_spans(hints: &[(&'static str, &'static str)], max_width: usize) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw(" ")];
    let mut current_width = 1;

    for (i, (key, action)) in hints.iter().enumerate() {
        // " │ " separator before every hint but the first
        let sep_width = if i > 0 { 3 } else { 0 };
        let item_width = key.chars().count() + 1 + action.len() + sep_width;

        if current_width + item_width > max_width {
            break;
        }

        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(theme::HINT_SEPARATOR)));
        }
        spans.push(Span::styled(
            *key,
            Style::default()
                .fg(theme::ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(*action, Style::default().fg(theme::TEXT_SECONDARY)));

        current_width += item_width;
    }
    spans
}

fn render_hints(frame: &mut Frame, area: Rect, hints: &[(&'static str, &'static str)]) {
    let chunks = Layout::horizontal([Constraint::Min(0), Constraint::Length(22)]).split(area);

    let spans = hint_spans(hints, usize::from(chunks[0].width));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let branding = Line::from(vec![Span::styled(
        format!(
            "{} v{} ",
            crate::constants::APP_NAME,
            crate::constants::APP_VERSION
        ),
        Style::default().fg(theme::NORD_POLAR_NIGHT_4),
    )]);
    frame.render_widget(
        Paragraph::new(branding).alignment(Alignment::Right),
        chunks[1],
    );
}
