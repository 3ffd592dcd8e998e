//! Date-indexed line charts shared by the Summary, Performance and Risk
//! panels.

use chrono::{Datelike, NaiveDate};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use crate::filters::Series;
use crate::theme;

/// Points of one series in chart coordinates (day number, value). Non-finite
/// values are left out; the line simply skips them.
pub fn to_points(points: &[(NaiveDate, f64)]) -> Vec<(f64, f64)> {
    points
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(d, v)| (d.num_days_from_ce() as f64, *v))
        .collect()
}

/// `[min, max]` of x and y over every point, y padded by 5%.
pub fn bounds(series: &[Vec<(f64, f64)>]) -> Option<([f64; 2], [f64; 2])> {
    let mut x = [f64::INFINITY, f64::NEG_INFINITY];
    let mut y = [f64::INFINITY, f64::NEG_INFINITY];
    for &(px, py) in series.iter().flatten() {
        x = [x[0].min(px), x[1].max(px)];
        y = [y[0].min(py), y[1].max(py)];
    }
    if !x[0].is_finite() {
        return None;
    }
    if x[0] == x[1] {
        x[1] = x[0] + 1.0;
    }
    let pad = ((y[1] - y[0]).abs() * 0.05).max(1e-9);
    Some((x, [y[0] - pad, y[1] + pad]))
}

fn day_label(day: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(day.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Line chart of named date series inside a titled border.
pub fn render_series(f: &mut Frame, area: Rect, title: &str, series: &Series, y_title: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(" {title} "))
        .title_style(theme::accent());

    let names: Vec<&str> = series.keys().copied().collect();
    let points: Vec<Vec<(f64, f64)>> = series.values().map(|p| to_points(p)).collect();

    let Some((x_bounds, y_bounds)) = bounds(&points) else {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No data for the current selection.",
            theme::muted(),
        )))
        .block(block);
        f.render_widget(msg, area);
        return;
    };

    let datasets: Vec<Dataset> = names
        .iter()
        .zip(&points)
        .enumerate()
        .map(|(i, (name, data))| {
            Dataset::default()
                .name(name.to_string())
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(theme::series_color(i)))
                .graph_type(GraphType::Line)
                .data(data)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds(x_bounds)
                .labels(vec![
                    Span::styled(day_label(x_bounds[0]), theme::muted()),
                    Span::styled(day_label(x_bounds[1]), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(y_title.to_string(), theme::muted()))
                .style(theme::muted())
                .bounds(y_bounds)
                .labels(vec![
                    Span::styled(format!("{:.2}", y_bounds[0]), theme::muted()),
                    Span::styled(format!("{:.2}", y_bounds[1]), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}
