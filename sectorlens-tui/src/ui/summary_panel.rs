//! Panel 1 - Summary: per-firm price change, sector stats or movers, and
//! price trends at firm and group level.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use sectorlens_core::domain::{GroupKey, MoverSummary};

use crate::app::{AppState, SummaryMode};
use crate::filters;
use crate::theme;
use crate::ui::{chart, fmt_num, truncate};

/// Width of the text bar drawn next to each price change.
const BAR_WIDTH: usize = 20;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Percentage(55),
            Constraint::Min(6),
        ])
        .split(area);

    render_header(f, rows[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    match app.summary_mode {
        SummaryMode::BySector => render_by_sector(f, middle[0], app),
        SummaryMode::Movers => render_movers(f, middle[0], app),
    }

    let trend = filters::filter_trend(&app.dataset.trend, &app.filters);
    let series = filters::firm_close_series(&trend);
    chart::render_series(f, middle[1], "Price Trend for Selected Firms", &series, "Close");

    let (points, title) = match app.trend_level {
        GroupKey::SuperSector => (
            &app.dataset.super_sector_trend,
            "Average Price Trend by Super Sector",
        ),
        GroupKey::Sector => (&app.dataset.sector_trend, "Average Price Trend by Sector"),
    };
    let kept = filters::filter_group_trend(points, &app.filters);
    let group_series = filters::group_close_series(&kept);
    chart::render_series(f, rows[2], title, &group_series, "Mean Close");
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let flt = &app.filters;
    let super_sector = flt.super_sector.as_deref().unwrap_or("All Super Sectors");
    let range = match app.date_bounds() {
        Some(bounds) => {
            let (start, end) = flt.resolved_range(bounds);
            format!("{start} .. {end}")
        }
        None => "no dates".to_string(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Super Sector: ", theme::muted()),
            Span::styled(super_sector.to_string(), theme::accent()),
            Span::styled("  Sectors: ", theme::muted()),
            Span::styled(flt.sectors.len().to_string(), theme::accent()),
            Span::styled("  Firms: ", theme::muted()),
            Span::styled(flt.firms.len().to_string(), theme::accent()),
            Span::styled("  Dates: ", theme::muted()),
            Span::styled(range, theme::accent()),
        ]),
        Line::from(vec![
            Span::styled("View: ", theme::muted()),
            Span::styled(app.summary_mode.label(), theme::neutral()),
            Span::styled("  Trend: ", theme::muted()),
            Span::styled(app.trend_level.label(), theme::neutral()),
            Span::styled(
                "   [f]ilters [v]iew [g]roup level [x] export",
                theme::muted(),
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_by_sector(f: &mut Frame, area: Rect, app: &AppState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Min(4)])
        .split(area);

    let changes = filters::filter_price_changes(&app.dataset.price_changes, &app.filters);
    render_change_bars(f, parts[0], "% Change per Firm", &changes);

    let header = Row::new(["Sector", "Mean", "Median", "Std Dev", "Firms"]).style(theme::accent_bold());
    let rows: Vec<Row> = app
        .dataset
        .sector_summary
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(truncate(&s.sector, 28)),
                Cell::from(fmt_num(s.mean_change, 2)).style(theme::metric_color(s.mean_change)),
                Cell::from(fmt_num(s.median_change, 2)).style(theme::metric_color(s.median_change)),
                Cell::from(fmt_num(s.std_dev, 2)),
                Cell::from(s.num_firms.to_string()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(titled("Sector Summary Stats"));
    f.render_widget(table, parts[1]);
}

fn render_movers(f: &mut Frame, area: Rect, app: &AppState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let top: Vec<&MoverSummary> = app.dataset.top_movers.iter().collect();
    let bottom: Vec<&MoverSummary> = app.dataset.bottom_movers.iter().collect();
    render_change_bars(f, parts[0], "Top Movers", &top);
    render_change_bars(f, parts[1], "Bottom Movers", &bottom);
}

/// One row per firm: name, sector, change in percent and a proportional bar.
fn render_change_bars(f: &mut Frame, area: Rect, title: &str, changes: &[&MoverSummary]) {
    let block = titled(title);
    if changes.is_empty() {
        let msg = Paragraph::new(Span::styled("No firms selected.", theme::muted())).block(block);
        f.render_widget(msg, area);
        return;
    }

    let max_abs = changes
        .iter()
        .map(|m| m.pct_change.abs())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let rows: Vec<Row> = changes
        .iter()
        .map(|m| {
            let style = theme::metric_color(m.pct_change);
            Row::new(vec![
                Cell::from(truncate(&m.firm, 30)),
                Cell::from(truncate(&m.sector, 18)).style(theme::muted()),
                Cell::from(format!("{:>8}%", fmt_num(m.pct_change, 2))).style(style),
                Cell::from(pct_bar(m.pct_change, max_abs, BAR_WIDTH)).style(style),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Length(18),
            Constraint::Length(10),
            Constraint::Length(BAR_WIDTH as u16),
        ],
    )
    .block(block);
    f.render_widget(table, area);
}

fn titled(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(" {title} "))
        .title_style(theme::accent())
}

/// Bar of `width * |pct| / max_abs` cells. Undefined changes draw nothing.
pub fn pct_bar(pct: f64, max_abs: f64, width: usize) -> String {
    if !pct.is_finite() || max_abs <= 0.0 || width == 0 {
        return String::new();
    }
    let len = ((pct.abs() / max_abs) * width as f64).round() as usize;
    "█".repeat(len.clamp(usize::from(pct != 0.0), width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_largest_move() {
        assert_eq!(pct_bar(10.0, 10.0, 20).chars().count(), 20);
        assert_eq!(pct_bar(-5.0, 10.0, 20).chars().count(), 10);
        assert_eq!(pct_bar(0.01, 10.0, 20).chars().count(), 1);
        assert_eq!(pct_bar(0.0, 10.0, 20), "");
        assert_eq!(pct_bar(f64::NAN, 10.0, 20), "");
        assert_eq!(pct_bar(3.0, 0.0, 20), "");
    }
}
