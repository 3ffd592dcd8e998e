//! Top-level UI layout - one panel at a time plus a status bar.

pub mod chart;
pub mod correlation_panel;
pub mod data_panel;
pub mod help_panel;
pub mod overlays;
pub mod performance_panel;
pub mod risk_panel;
pub mod status_bar;
pub mod summary_panel;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    draw_panel(f, main_area, app);
    status_bar::render(f, status_area, app);

    match app.overlay {
        Overlay::Filters => overlays::render_filters(f, main_area, app),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::None => {}
    }
}

fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Summary => summary_panel::render(f, inner, app),
        Panel::Performance => performance_panel::render(f, inner, app),
        Panel::Risk => risk_panel::render(f, inner, app),
        Panel::Correlation => correlation_panel::render(f, inner, app),
        Panel::Data => data_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Number for display. Undefined values print as `NaN`, never as zero.
pub fn fmt_num(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.decimals$}")
    }
}

/// Optional number for display. Absent values print blank.
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map(|v| fmt_num(v, decimals)).unwrap_or_default()
}

/// First row of a `height`-row window that keeps `cursor` visible.
pub fn scroll_start(cursor: usize, height: usize) -> usize {
    if height == 0 {
        0
    } else {
        cursor.saturating_sub(height - 1)
    }
}

/// Cut `s` to `width` characters, marking the cut with `…`.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_are_not_zero() {
        assert_eq!(fmt_num(f64::NAN, 2), "NaN");
        assert_eq!(fmt_num(-0.1234, 2), "-0.12");
        assert_eq!(fmt_opt(None, 4), "");
        assert_eq!(fmt_opt(Some(0.1), 2), "0.10");
    }

    #[test]
    fn scroll_window_follows_cursor() {
        assert_eq!(scroll_start(0, 10), 0);
        assert_eq!(scroll_start(9, 10), 0);
        assert_eq!(scroll_start(15, 10), 6);
        assert_eq!(scroll_start(3, 0), 0);
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Energy", 10), "Energy");
        assert_eq!(truncate("Telecommunication Services", 8), "Telecom…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let r = centered_rect(60, 40, area);
        assert!(r.x >= 20 && r.right() <= 80);
        assert!(r.y >= 15 && r.bottom() <= 35);
    }
}
