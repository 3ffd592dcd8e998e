//! Keyboard input dispatch - overlays then global keys, then panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{toggle_group, AppState, FilterFocus, Overlay, Panel};

/// Rows moved by PageUp/PageDown in the data browser.
const PAGE: usize = 20;
/// Days moved by H/L in the date range editor.
const DATE_STEP_LARGE: i64 = 30;

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Filters => {
            handle_filter_overlay(app, key);
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='6') => {
            let idx = (c as u8 - b'1') as usize;
            if let Some(panel) = Panel::from_index(idx) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('e') => {
            app.overlay = Overlay::ErrorHistory;
            app.error_scroll = 0;
            return;
        }
        KeyCode::Char('x') => {
            app.export_current();
            return;
        }
        KeyCode::Char('r') => {
            app.reload();
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Summary => handle_summary_key(app, key),
        Panel::Performance => handle_performance_key(app, key),
        Panel::Risk => handle_risk_key(app, key),
        Panel::Correlation => handle_correlation_key(app, key),
        Panel::Data => handle_data_key(app, key),
        Panel::Help => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_filter_overlay(app: &mut AppState, key: KeyEvent) {
    let in_dates = app.filter_editor.focus == FilterFocus::Dates;
    match key.code {
        KeyCode::Esc | KeyCode::Char('f') | KeyCode::Char('q') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Tab => {
            app.filter_editor.focus = app.filter_editor.focus.next();
            app.filter_editor.cursor = 0;
        }
        KeyCode::BackTab => {
            app.filter_editor.focus = app.filter_editor.focus.prev();
            app.filter_editor.cursor = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let len = app.filter_items().len();
            if app.filter_editor.cursor + 1 < len {
                app.filter_editor.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.filter_editor.cursor = app.filter_editor.cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') | KeyCode::Enter => app.activate_filter_item(),
        KeyCode::Char('a') => app.set_all_filter_items(true),
        KeyCode::Char('d') => app.set_all_filter_items(false),
        KeyCode::Char('h') | KeyCode::Left if in_dates => app.shift_filter_date(-1),
        KeyCode::Char('l') | KeyCode::Right if in_dates => app.shift_filter_date(1),
        KeyCode::Char('H') if in_dates => app.shift_filter_date(-DATE_STEP_LARGE),
        KeyCode::Char('L') if in_dates => app.shift_filter_date(DATE_STEP_LARGE),
        KeyCode::Char('c') if in_dates => app.filters.clear_range(),
        _ => {}
    }
}

fn handle_summary_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('f') => {
            app.overlay = Overlay::Filters;
            app.filter_editor.cursor = 0;
        }
        KeyCode::Char('v') => app.summary_mode = app.summary_mode.toggle(),
        KeyCode::Char('g') => app.trend_level = toggle_group(app.trend_level),
        _ => {}
    }
}

fn handle_performance_key(app: &mut AppState, key: KeyEvent) {
    let count = app.compare_options().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.compare.cursor + 1 < count {
                app.compare.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.compare.cursor = app.compare.cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_compare_at_cursor(),
        KeyCode::Char('c') => {
            app.compare.firms.clear();
            app.compare.focus = 0;
        }
        _ => {}
    }
}

fn handle_risk_key(app: &mut AppState, key: KeyEvent) {
    let count = app.compare.firms.len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('l') | KeyCode::Right => {
            if app.compare.focus + 1 < count {
                app.compare.focus += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up | KeyCode::Char('h') | KeyCode::Left => {
            app.compare.focus = app.compare.focus.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_correlation_key(app: &mut AppState, key: KeyEvent) {
    let n = app.correlation_matrix().len();
    let corr = &mut app.correlation;
    match key.code {
        KeyCode::Char('t') => {
            corr.level = toggle_group(corr.level);
            corr.row_offset = 0;
            corr.col_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if corr.row_offset + 1 < n {
                corr.row_offset += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => corr.row_offset = corr.row_offset.saturating_sub(1),
        KeyCode::Char('l') | KeyCode::Right => {
            if corr.col_offset + 1 < n {
                corr.col_offset += 1;
            }
        }
        KeyCode::Char('h') | KeyCode::Left => corr.col_offset = corr.col_offset.saturating_sub(1),
        _ => {}
    }
}

fn handle_data_key(app: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.open_browser_entry();
        return;
    }
    let rows = app.browser.table.as_ref().map_or(0, |t| t.rows.len());
    let browser = &mut app.browser;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if browser.index + 1 < browser.entries.len() {
                browser.index += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => browser.index = browser.index.saturating_sub(1),
        KeyCode::PageDown | KeyCode::Char('J') => {
            browser.scroll = (browser.scroll + PAGE).min(rows.saturating_sub(1));
        }
        KeyCode::PageUp | KeyCode::Char('K') => {
            browser.scroll = browser.scroll.saturating_sub(PAGE);
        }
        KeyCode::Home | KeyCode::Char('g') => browser.scroll = 0,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::NaiveDate;
    use crossterm::event::KeyEventState;
    use sectorlens_core::domain::{GroupKey, PriceRow};

    use crate::app::SummaryMode;
    use crate::dataset::Dataset;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> AppState {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let row = |firm: &str, sector: &str| PriceRow {
            date,
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            sector: sector.into(),
            super_sector: sector.into(),
            firm: firm.into(),
        };
        let mut ds = Dataset {
            trend: vec![row("A", "Energy"), row("B", "Banks"), row("C", "Banks")],
            ..Default::default()
        };
        ds.rebuild_universe();
        AppState::new(ds, PathBuf::from("exports"))
    }

    #[test]
    fn number_keys_switch_panels() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Char('4')));
        assert_eq!(app.active_panel, Panel::Correlation);
        handle_key(&mut app, press(KeyCode::Char('6')));
        assert_eq!(app.active_panel, Panel::Help);
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.active_panel, Panel::Summary);
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.active_panel, Panel::Help);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = app();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        handle_key(&mut app, key);
        assert!(app.running);
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn summary_toggles() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Char('v')));
        assert_eq!(app.summary_mode, SummaryMode::Movers);
        handle_key(&mut app, press(KeyCode::Char('g')));
        assert_eq!(app.trend_level, GroupKey::Sector);
    }

    #[test]
    fn filter_overlay_consumes_keys() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Char('f')));
        assert_eq!(app.overlay, Overlay::Filters);

        // '2' is not a panel switch while the overlay is open.
        handle_key(&mut app, press(KeyCode::Char('2')));
        assert_eq!(app.active_panel, Panel::Summary);

        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.filter_editor.focus, FilterFocus::Sectors);
        handle_key(&mut app, press(KeyCode::Char('d')));
        assert!(app.filters.sectors.is_empty());
        assert!(app.filters.firms.is_empty());
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert_eq!(app.filters.sectors.iter().collect::<Vec<_>>(), vec!["Banks"]);

        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn date_keys_only_apply_in_date_section() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Char('f')));
        handle_key(&mut app, press(KeyCode::Char('l')));
        assert_eq!(app.filters.start, None);
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.filter_editor.focus, FilterFocus::Dates);
        handle_key(&mut app, press(KeyCode::Char('l')));
        assert_eq!(app.filters.start, NaiveDate::from_ymd_opt(2024, 1, 2));
        handle_key(&mut app, press(KeyCode::Char('c')));
        assert_eq!(app.filters.start, None);
    }

    #[test]
    fn performance_cursor_and_toggle() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Char('2')));
        handle_key(&mut app, press(KeyCode::Char('c')));
        assert!(app.compare.firms.is_empty());
        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.compare.cursor, 2);
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert!(app.compare.firms.contains("C"));
    }

    #[test]
    fn error_overlay_opens_and_closes() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Char('e')));
        assert_eq!(app.overlay, Overlay::ErrorHistory);
        handle_key(&mut app, press(KeyCode::Char('x')));
        assert_eq!(app.overlay, Overlay::ErrorHistory);
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn correlation_toggle_resets_scroll() {
        let mut app = app();
        app.active_panel = Panel::Correlation;
        app.correlation.row_offset = 3;
        handle_key(&mut app, press(KeyCode::Char('t')));
        assert_eq!(app.correlation.level, GroupKey::SuperSector);
        assert_eq!(app.correlation.row_offset, 0);
    }
}
