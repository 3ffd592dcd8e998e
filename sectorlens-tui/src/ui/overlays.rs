//! Overlay widgets: filter editor and error history.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, FilterFocus};
use crate::theme;
use crate::ui::{centered_rect, scroll_start, truncate};

const SECTIONS: [FilterFocus; 4] = [
    FilterFocus::SuperSector,
    FilterFocus::Sectors,
    FilterFocus::Firms,
    FilterFocus::Dates,
];

/// Four columns, one per filter section. Only the focused one has a cursor.
pub fn render_filters(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(90, 80, area);
    f.render_widget(Clear, popup);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Filters [Tab]section [Space]select [a]ll [d]none [Esc]close ")
        .title_style(theme::accent_bold());
    let inner = outer.inner(popup);
    f.render_widget(outer, popup);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(22),
            Constraint::Percentage(28),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
        ])
        .split(inner);

    for (section, col) in SECTIONS.iter().zip(cols.iter()) {
        let focused = app.filter_editor.focus == *section;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::panel_border(focused))
            .title(format!(" {} ", section.label()))
            .title_style(theme::panel_title(focused));
        let body = block.inner(*col);
        f.render_widget(block, *col);

        let lines = if *section == FilterFocus::Dates {
            date_lines(app, focused)
        } else {
            item_lines(app, *section, focused, body)
        };
        f.render_widget(Paragraph::new(lines), body);
    }
}

fn item_lines(app: &AppState, section: FilterFocus, focused: bool, body: Rect) -> Vec<Line<'static>> {
    let items = app.filter_items_for(section);

    if items.is_empty() {
        let hint = match section {
            FilterFocus::Firms => "Select a sector first.",
            _ => "Nothing to choose.",
        };
        return vec![Line::from(Span::styled(hint, theme::muted()))];
    }

    let height = body.height as usize;
    let cursor = if focused { app.filter_editor.cursor } else { 0 };
    let start = scroll_start(cursor, height);
    let width = (body.width as usize).saturating_sub(4);

    items
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, item)| {
            let selected = app.is_filter_item_selected(section, item);
            let mark = match (section, selected) {
                (FilterFocus::SuperSector, true) => "(•) ",
                (FilterFocus::SuperSector, false) => "( ) ",
                (_, true) => "[x] ",
                (_, false) => "[ ] ",
            };
            let style = if focused && i == cursor {
                theme::selected_row()
            } else if selected {
                theme::accent()
            } else {
                theme::muted()
            };
            Line::from(vec![Span::raw(mark), Span::styled(truncate(item, width), style)])
        })
        .collect()
}

fn date_lines(app: &AppState, focused: bool) -> Vec<Line<'static>> {
    let Some(bounds) = app.date_bounds() else {
        return vec![Line::from(Span::styled("No dates loaded.", theme::muted()))];
    };
    let (start, end) = app.filters.resolved_range(bounds);
    let row = |i: usize, label: &str, value: String| {
        let style = if focused && app.filter_editor.cursor == i {
            theme::selected_row()
        } else {
            theme::accent()
        };
        Line::from(vec![
            Span::styled(format!("{label:<6}"), theme::muted()),
            Span::styled(value, style),
        ])
    };
    vec![
        row(0, "Start", start.to_string()),
        row(1, "End", end.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            format!("Data: {} .. {}", bounds.0, bounds.1),
            theme::muted(),
        )),
        Line::from(""),
        Line::from(Span::styled("[h/l] ±1 day", theme::muted())),
        Line::from(Span::styled("[H/L] ±30 days", theme::muted())),
        Line::from(Span::styled("[c] full range", theme::muted())),
    ]
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let visible_height = inner.height as usize;
    let start = app.error_scroll;
    let end = (start + visible_height).min(app.error_history.len());

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app.error_history.iter().enumerate().take(end).skip(start) {
        let style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", err.timestamp.format("%H:%M:%S")),
                theme::muted(),
            ),
            Span::styled(format!("[{}] ", err.category.label()), theme::warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme::muted()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}
