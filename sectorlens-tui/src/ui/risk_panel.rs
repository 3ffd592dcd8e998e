//! Panel 3 - Volatility & Drawdowns: daily returns, rolling volatility and
//! drawdown of one compared firm, plus every compared firm's max drawdown.
//!
//! All figures come from `daily_metrics.csv` and `drawdowns.csv` as stored.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use sectorlens_core::domain::DailyMetricRow;

use crate::app::AppState;
use crate::filters::{self, Series};
use crate::theme;
use crate::ui::{chart, fmt_num, truncate};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(20)])
        .split(area);

    render_drawdown_table(f, cols[0], app);

    let Some(firm) = app.focused_compare_firm() else {
        f.render_widget(
            Paragraph::new(Span::styled(
                "Choose firms on the Performance panel (press 2).",
                theme::muted(),
            )),
            cols[1],
        );
        return;
    };

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(cols[1]);

    let daily = filters::daily_for_firm(&app.dataset.daily, firm);
    let (returns, drawdown) = risk_series(&daily);
    chart::render_series(
        f,
        charts[0],
        &format!("{firm} Daily Return & Volatility"),
        &returns,
        "Return",
    );
    chart::render_series(f, charts[1], &format!("{firm} Drawdown"), &drawdown, "Drawdown");
}

/// Returns and volatility (present values only) and the drawdown series.
pub fn risk_series(rows: &[&DailyMetricRow]) -> (Series<'static>, Series<'static>) {
    let mut returns: Vec<(NaiveDate, f64)> = Vec::new();
    let mut volatility: Vec<(NaiveDate, f64)> = Vec::new();
    let mut drawdown: Vec<(NaiveDate, f64)> = Vec::new();
    for r in rows {
        if let Some(v) = r.daily_return {
            returns.push((r.date, v));
        }
        if let Some(v) = r.rolling_volatility {
            volatility.push((r.date, v));
        }
        drawdown.push((r.date, r.drawdown));
    }

    let mut first = BTreeMap::new();
    first.insert("Daily Return", returns);
    first.insert("Rolling Volatility", volatility);
    let mut second = BTreeMap::new();
    second.insert("Drawdown", drawdown);
    (first, second)
}

fn render_drawdown_table(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Max Drawdown [j/k] focus ")
        .title_style(theme::accent());

    let focused = app.focused_compare_firm();
    let rows: Vec<Row> = app
        .compare
        .firms
        .iter()
        .map(|firm| {
            let value = app.dataset.max_drawdown_of(firm);
            let shown = value.map(|v| format!("{}%", fmt_num(v * 100.0, 2)));
            let name_style = if Some(firm.as_str()) == focused {
                theme::selected_row()
            } else {
                theme::text()
            };
            Row::new(vec![
                Cell::from(truncate(firm, 28)).style(name_style),
                Cell::from(shown.unwrap_or_default())
                    .style(theme::metric_color(value.unwrap_or(f64::NAN))),
            ])
        })
        .collect();

    if rows.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled("No firms compared.", theme::muted())))
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(10)])
        .header(Row::new(["Firm", "Max DD"]).style(theme::accent_bold()))
        .block(block);
    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_are_left_out_of_charts() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let mk = |day, ret: Option<f64>, vol: Option<f64>, dd| DailyMetricRow {
            date: d(day),
            firm: "A".into(),
            sector: "S".into(),
            super_sector: "SS".into(),
            close: 1.0,
            daily_return: ret,
            rolling_volatility: vol,
            drawdown: dd,
        };
        let rows = [mk(2, None, None, 0.0), mk(3, Some(-0.1), None, -0.1)];
        let refs: Vec<&DailyMetricRow> = rows.iter().collect();
        let (returns, drawdown) = risk_series(&refs);
        assert_eq!(returns["Daily Return"], vec![(d(3), -0.1)]);
        assert!(returns["Rolling Volatility"].is_empty());
        assert_eq!(drawdown["Drawdown"].len(), 2);
    }
}
