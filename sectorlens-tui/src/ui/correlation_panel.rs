//! Panel 4 - Correlation: sector or super sector heat table, read from the
//! stored matrices.

use ratatui::layout::{Constraint, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use sectorlens_core::domain::GroupKey;

use crate::app::AppState;
use crate::theme;
use crate::ui::{fmt_num, truncate};

const LABEL_WIDTH: u16 = 26;
const CELL_WIDTH: u16 = 8;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let level = app.correlation.level;
    let title = match level {
        GroupKey::Sector => " Sector Return Correlation Matrix [t]oggle [hjkl] scroll ",
        GroupKey::SuperSector => " Super Sector Return Correlation Matrix [t]oggle [hjkl] scroll ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(title)
        .title_style(theme::accent());

    let matrix = app.correlation_matrix();
    if matrix.is_empty() {
        let msg = Paragraph::new(Span::styled(
            "No correlation matrix loaded for this level.",
            theme::muted(),
        ))
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2);
    let visible_cols = (inner_width.saturating_sub(LABEL_WIDTH) / CELL_WIDTH).max(1) as usize;
    let col_start = app.correlation.col_offset.min(matrix.len().saturating_sub(1));
    let col_end = (col_start + visible_cols).min(matrix.len());
    let row_start = app.correlation.row_offset.min(matrix.len().saturating_sub(1));

    let mut header_cells = vec![Cell::from("")];
    header_cells.extend(
        matrix.labels[col_start..col_end]
            .iter()
            .map(|l| Cell::from(truncate(l, CELL_WIDTH as usize - 1))),
    );
    let header = Row::new(header_cells).style(theme::accent_bold());

    let rows: Vec<Row> = matrix
        .labels
        .iter()
        .zip(&matrix.values)
        .skip(row_start)
        .map(|(label, values)| {
            let mut cells = vec![Cell::from(truncate(label, LABEL_WIDTH as usize - 1))
                .style(theme::accent())];
            cells.extend(
                values[col_start..col_end]
                    .iter()
                    .map(|&r| Cell::from(format!("{:>6}", fmt_num(r, 2))).style(theme::heat_style(r))),
            );
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(LABEL_WIDTH)];
    widths.extend(std::iter::repeat(Constraint::Length(CELL_WIDTH)).take(col_end - col_start));

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
