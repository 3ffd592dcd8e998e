//! Panel 2 - Performance: close price comparison of chosen firms.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::AppState;
use crate::filters;
use crate::theme;
use crate::ui::{chart, scroll_start, truncate};

const LIST_WIDTH: u16 = 36;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LIST_WIDTH), Constraint::Min(20)])
        .split(area);

    render_firm_list(f, cols[0], app);

    let rows = filters::rows_for_firms(&app.dataset.trend, &app.compare.firms);
    let series = filters::firm_close_series(&rows);
    chart::render_series(f, cols[1], "Stock Price Comparison", &series, "Close");
}

fn render_firm_list(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(" Firms ({} compared) ", app.compare.firms.len()))
        .title_style(theme::accent());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let options = app.compare_options();
    if options.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("No price trend table loaded.", theme::muted())),
            inner,
        );
        return;
    }

    let height = inner.height.saturating_sub(1) as usize;
    let start = scroll_start(app.compare.cursor, height);
    let mut lines = vec![Line::from(Span::styled(
        "[Space]toggle [c]lear [j/k]move",
        theme::muted(),
    ))];
    for (i, firm) in options.iter().enumerate().skip(start).take(height) {
        let selected = app.compare.firms.contains(*firm);
        let check = if selected { "[x] " } else { "[ ] " };
        let style = if i == app.compare.cursor {
            theme::selected_row()
        } else if selected {
            theme::accent()
        } else {
            theme::muted()
        };
        let width = (inner.width as usize).saturating_sub(4);
        lines.push(Line::from(vec![
            Span::raw(check),
            Span::styled(truncate(firm, width), style),
        ]));
    }
    f.render_widget(Paragraph::new(lines), inner);
}
