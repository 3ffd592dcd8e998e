//! Panel 6 - Help: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-6", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "x", "Download the displayed table(s) as CSV");
    key(&mut lines, "r", "Reload tables from the output directory");
    key(&mut lines, "e", "Open error history");
    key(&mut lines, "q", "Quit (filters are saved)");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 - Summary");
    key(&mut lines, "f", "Edit filters: super sector, sectors, firms, dates");
    key(&mut lines, "v", "Grouped by sector / top & bottom movers");
    key(&mut lines, "g", "Group trend by super sector / sector");
    lines.push(Line::from(""));

    section(&mut lines, "Filter overlay");
    key(&mut lines, "Tab / Shift+Tab", "Next / previous section");
    key(&mut lines, "j / k", "Move cursor");
    key(&mut lines, "Space / Enter", "Select item");
    key(&mut lines, "a / d", "Select all / none in section");
    key(&mut lines, "h / l, H / L", "Dates: shift 1 / 30 days");
    key(&mut lines, "c", "Dates: full range");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2 - Performance");
    key(&mut lines, "j / k", "Move through firms");
    key(&mut lines, "Space", "Add / remove firm from comparison");
    key(&mut lines, "c", "Clear comparison");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 - Volatility & Drawdowns");
    key(&mut lines, "j / k", "Focus next / previous compared firm");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 4 - Correlation");
    key(&mut lines, "t", "Sector / super sector matrix");
    key(&mut lines, "h j k l", "Scroll columns and rows");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 5 - Data");
    key(&mut lines, "j / k", "Choose table");
    key(&mut lines, "Enter", "Open table");
    key(&mut lines, "J / K, PgDn / PgUp", "Page through rows");
    lines.push(Line::from(""));

    section(&mut lines, "Output directory");
    lines.push(Line::from(Span::styled(
        format!("  {}", app.dataset.output_dir.display()),
        theme::muted(),
    )));
    if let Some(m) = &app.dataset.manifest {
        lines.push(Line::from(Span::styled(
            format!(
                "  run finished {} · {} source files · {} rows cleaned",
                m.finished_at.format("%Y-%m-%d %H:%M UTC"),
                m.source_files.len(),
                m.clean_report.output_rows
            ),
            theme::muted(),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("  exports go to {}", app.export_dir.display()),
        theme::muted(),
    )));

    f.render_widget(Paragraph::new(lines), area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>20}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
