//! Panel 5 - Data: browse any output table exactly as stored.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use sectorlens_runner::RawCsv;

use crate::app::AppState;
use crate::theme;
use crate::ui::{scroll_start, truncate};

const LIST_WIDTH: u16 = 44;
const MAX_COL_WIDTH: usize = 28;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LIST_WIDTH), Constraint::Min(20)])
        .split(area);

    render_entries(f, cols[0], app);
    render_table(f, cols[1], app);
}

fn render_entries(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Tables [Enter]open [x]download ")
        .title_style(theme::accent());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let height = inner.height as usize;
    let start = scroll_start(app.browser.index, height);
    let lines: Vec<Line> = app
        .browser
        .entries
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, name)| {
            let style = if i == app.browser.index {
                theme::selected_row()
            } else {
                theme::text()
            };
            Line::from(Span::styled(truncate(name, inner.width as usize), style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn render_table(f: &mut Frame, area: Rect, app: &AppState) {
    let title = match (&app.browser.table, app.browser.selected_entry()) {
        (Some(t), Some(name)) => format!(
            " {name} - {} rows, from row {} [J/K] page ",
            t.rows.len(),
            app.browser.scroll + 1
        ),
        _ => " No table open ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(title)
        .title_style(theme::accent());

    let Some(table) = &app.browser.table else {
        let msg = Paragraph::new(Span::styled(
            "Select a table and press Enter.",
            theme::muted(),
        ))
        .block(block);
        f.render_widget(msg, area);
        return;
    };

    let visible = area.height.saturating_sub(3) as usize;
    let widths = column_widths(table, app.browser.scroll, visible);
    let header = Row::new(
        table
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, &w)| Cell::from(truncate(h, w))),
    )
    .style(theme::accent_bold());

    let rows: Vec<Row> = table
        .rows
        .iter()
        .skip(app.browser.scroll)
        .take(visible)
        .map(|r| {
            Row::new(
                r.iter()
                    .zip(&widths)
                    .map(|(c, &w)| Cell::from(truncate(c, w))),
            )
        })
        .collect();

    let constraints: Vec<Constraint> = widths
        .iter()
        .map(|&w| Constraint::Length(w as u16))
        .collect();
    let widget = Table::new(rows, constraints).header(header).block(block);
    f.render_widget(widget, area);
}

/// Per-column width from the header and the visible rows, capped.
pub fn column_widths(table: &RawCsv, scroll: usize, visible: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in table.rows.iter().skip(scroll).take(visible) {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths.into_iter().map(|w| w.clamp(1, MAX_COL_WIDTH)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_follow_visible_rows() {
        let table = RawCsv {
            headers: vec!["Firm".into(), "Close".into()],
            rows: vec![
                vec!["A very long firm name that exceeds the cap".into(), "1".into()],
                vec!["B".into(), "".into()],
            ],
        };
        assert_eq!(column_widths(&table, 0, 10), vec![MAX_COL_WIDTH, 5]);
        assert_eq!(column_widths(&table, 1, 10), vec![4, 5]);
    }
}
