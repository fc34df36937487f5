// UI rendering logic
//
// One frame: history list on the left, preview of the selected entry on the
// right, and a single status row underneath. The toast, when present, is
// drawn last so it sits on top.

use super::app::{App, Mode};
use crate::storage::Entry;
use crate::transform::Transform;
use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // List + preview
            Constraint::Length(1), // Status line
        ])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    // Borders take one row top and bottom
    app.set_viewport(columns[0].height.saturating_sub(2) as usize);
    app.clear_expired_toast();

    render_list(f, columns[0], app);
    render_preview(f, columns[1], app);
    render_status(f, rows[1], app);

    if let Some(toast) = &app.toast {
        toast.render(f, f.area());
    }
}

fn render_list(f: &mut Frame, area: Rect, app: &App) {
    let title = if app.query.is_empty() {
        format!(" History ({}) ", app.window.total())
    } else {
        format!(" Search \"{}\" ({}) ", app.query, app.window.total())
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let inner_width = area.width.saturating_sub(2) as usize;
    let (start, end) = app.window.visible_range();
    let selected = app.window.selected();

    let items: Vec<ListItem> = app.entries[start..end]
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let row = truncate_to_width(&list_row(entry), inner_width);
            let style = if start + i == selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else if entry.favorite {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(row, style)))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_preview(f: &mut Frame, area: Rect, app: &App) {
    let Some(entry) = app.selected_entry() else {
        let empty = Paragraph::new("(empty)")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Preview "));
        f.render_widget(empty, area);
        return;
    };

    let title = format!(
        " #{} · {}{} ",
        entry.id,
        format_timestamp(entry.timestamp),
        if entry.favorite { " · ★" } else { "" }
    );

    let preview = Paragraph::new(entry.text.as_str())
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(preview, area);
}

fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let line = match &app.mode {
        Mode::Browsing => {
            let mut spans = Vec::new();
            for (key, label) in [
                ("↑↓", "move"),
                ("Enter", "copy"),
                ("f", "fav"),
                ("d", "delete"),
                ("t", "transform"),
                ("/", "search"),
                ("q", "quit"),
            ] {
                spans.push(Span::styled(key, key_style));
                spans.push(Span::raw(format!(" {}  ", label)));
            }
            if !app.query.is_empty() {
                spans.push(Span::styled("Esc", key_style));
                spans.push(Span::raw(" clear search"));
            }
            Line::from(spans)
        }
        Mode::Searching { input } => Line::from(vec![
            Span::styled("Search: ", key_style),
            Span::raw(input.clone()),
            Span::styled("█", Style::default().fg(Color::DarkGray)),
        ]),
        Mode::Transforming => {
            let mut spans = vec![Span::raw("Transform: ")];
            for t in Transform::ALL {
                spans.push(Span::styled(t.key().to_string(), key_style));
                spans.push(Span::raw(format!(" {}  ", t.label())));
            }
            spans.push(Span::styled("Esc", key_style));
            spans.push(Span::raw(" cancel"));
            Line::from(spans)
        }
    };

    f.render_widget(Paragraph::new(line), area);
}

/// "* 1234 first line" - favorite marker, id, first line of the text
pub(crate) fn list_row(entry: &Entry) -> String {
    format!(
        "{} {:>4} {}",
        if entry.favorite { '*' } else { ' ' },
        entry.id,
        entry.first_line()
    )
}

/// Cut `s` so it occupies at most `max` terminal columns
pub(crate) fn truncate_to_width(s: &str, max: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max {
            break;
        }
        width += w;
        out.push(c);
    }
    out
}

fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "?".to_string())
}
