//! Application state - single-owner, main-thread only.
//!
//! All dashboard state lives here. Views are derived on demand from the
//! loaded [`Dataset`] and the current filters; nothing is cached between
//! frames.

use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use sectorlens_core::domain::{CorrelationMatrix, FirmDrawdown, GroupKey};
use sectorlens_runner::artifacts::{
    self, RawCsv, FIRM_CORRELATION_DIR, SECTOR_CORRELATION, SUPER_SECTOR_CORRELATION, TABLE_FILES,
};

use crate::dataset::{Dataset, LoadIssue};
use crate::export::{self, DisplayedTable};
use crate::filters::{self, FilterState};

const ERROR_HISTORY_CAP: usize = 50;
/// Firms preselected for comparison on first launch.
const SEED_COMPARE: usize = 2;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Summary,
    Performance,
    Risk,
    Correlation,
    Data,
    Help,
}

impl Panel {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        match self {
            Panel::Summary => 0,
            Panel::Performance => 1,
            Panel::Risk => 2,
            Panel::Correlation => 3,
            Panel::Data => 4,
            Panel::Help => 5,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Summary),
            1 => Some(Panel::Performance),
            2 => Some(Panel::Risk),
            3 => Some(Panel::Correlation),
            4 => Some(Panel::Data),
            5 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Summary => "Summary",
            Panel::Performance => "Performance",
            Panel::Risk => "Volatility & Drawdowns",
            Panel::Correlation => "Correlation",
            Panel::Data => "Data",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Panel::Summary)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or(Panel::Summary)
    }
}

/// What the Summary panel shows next to the firm trend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryMode {
    #[default]
    BySector,
    Movers,
}

impl SummaryMode {
    pub fn toggle(self) -> Self {
        match self {
            SummaryMode::BySector => SummaryMode::Movers,
            SummaryMode::Movers => SummaryMode::BySector,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SummaryMode::BySector => "Grouped by Sector",
            SummaryMode::Movers => "Top & Bottom Movers",
        }
    }
}

pub fn toggle_group(key: GroupKey) -> GroupKey {
    match key {
        GroupKey::Sector => GroupKey::SuperSector,
        GroupKey::SuperSector => GroupKey::Sector,
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Data,
    Export,
    State,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Data => "DATA",
            ErrorCategory::Export => "EXPORT",
            ErrorCategory::State => "STATE",
        }
    }
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Section of the filter overlay that has focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterFocus {
    #[default]
    SuperSector,
    Sectors,
    Firms,
    Dates,
}

impl FilterFocus {
    pub fn next(self) -> Self {
        match self {
            FilterFocus::SuperSector => FilterFocus::Sectors,
            FilterFocus::Sectors => FilterFocus::Firms,
            FilterFocus::Firms => FilterFocus::Dates,
            FilterFocus::Dates => FilterFocus::SuperSector,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FilterFocus::SuperSector => FilterFocus::Dates,
            FilterFocus::Sectors => FilterFocus::SuperSector,
            FilterFocus::Firms => FilterFocus::Sectors,
            FilterFocus::Dates => FilterFocus::Firms,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterFocus::SuperSector => "Super Sector",
            FilterFocus::Sectors => "Sectors",
            FilterFocus::Firms => "Firms",
            FilterFocus::Dates => "Date Range",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterEditor {
    pub focus: FilterFocus,
    pub cursor: usize,
}

/// Firms compared on the Performance and Risk panels.
#[derive(Debug, Clone, Default)]
pub struct CompareState {
    /// Row in the list of every firm.
    pub cursor: usize,
    pub firms: BTreeSet<String>,
    /// Which compared firm the Risk panel charts.
    pub focus: usize,
}

#[derive(Debug, Clone)]
pub struct CorrelationState {
    pub level: GroupKey,
    pub row_offset: usize,
    pub col_offset: usize,
}

impl Default for CorrelationState {
    fn default() -> Self {
        Self {
            level: GroupKey::Sector,
            row_offset: 0,
            col_offset: 0,
        }
    }
}

/// Data panel: any output file, shown as stored.
#[derive(Debug, Clone, Default)]
pub struct BrowserState {
    /// Relative file names under the output directory.
    pub entries: Vec<String>,
    pub index: usize,
    pub table: Option<RawCsv>,
    pub scroll: usize,
}

impl BrowserState {
    pub fn selected_entry(&self) -> Option<&str> {
        self.entries.get(self.index).map(String::as_str)
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Filters,
    ErrorHistory,
}

/// Top-level application state.
pub struct AppState {
    pub active_panel: Panel,
    pub running: bool,

    pub dataset: Dataset,
    pub filters: FilterState,
    pub summary_mode: SummaryMode,
    pub trend_level: GroupKey,
    pub compare: CompareState,
    pub correlation: CorrelationState,
    pub browser: BrowserState,
    pub filter_editor: FilterEditor,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,

    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(dataset: Dataset, export_dir: PathBuf) -> Self {
        let mut app = Self {
            active_panel: Panel::Summary,
            running: true,
            dataset,
            filters: FilterState::default(),
            summary_mode: SummaryMode::default(),
            trend_level: GroupKey::SuperSector,
            compare: CompareState::default(),
            correlation: CorrelationState::default(),
            browser: BrowserState::default(),
            filter_editor: FilterEditor::default(),
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            export_dir,
        };
        app.browser.entries = browser_entries(&app.dataset);
        app.normalize_selections();
        app
    }

    /// Reread every table from the output directory.
    pub fn reload(&mut self) {
        let (dataset, issues) = Dataset::load(&self.dataset.output_dir);
        self.dataset = dataset;
        self.browser.entries = browser_entries(&self.dataset);
        self.browser.index = self.browser.index.min(self.browser.entries.len().saturating_sub(1));
        self.browser.table = None;
        self.normalize_selections();
        if !self.report_issues(&issues) {
            self.set_status(format!("Reloaded {}", self.dataset.output_dir.display()));
        }
    }

    /// Record load issues. Returns whether there were any.
    pub fn report_issues(&mut self, issues: &[LoadIssue]) -> bool {
        for issue in issues {
            self.push_error(ErrorCategory::Data, issue.message.clone(), issue.file.clone());
        }
        match issues.len() {
            0 => false,
            n => {
                self.set_warning(format!("{n} table(s) unavailable; [e] for details"));
                true
            }
        }
    }

    /// Drop stale selections and seed empty ones from the data.
    pub fn normalize_selections(&mut self) {
        let universe = &self.dataset.universe;
        self.filters.retain_known(universe);
        if self.filters.is_blank() {
            self.filters = FilterState::seeded(universe);
        }
        if let Some((lo, hi)) = self.dataset.date_bounds() {
            let (start, end) = self.filters.resolved_range((lo, hi));
            if start > hi || end < lo || start > end {
                self.filters.clear_range();
            }
        }

        let firms = universe.all_firms();
        self.compare.firms.retain(|f| firms.contains(&f.as_str()));
        if self.compare.firms.is_empty() {
            self.compare.firms = firms
                .iter()
                .take(SEED_COMPARE)
                .map(|f| f.to_string())
                .collect();
        }
        self.compare.cursor = self.compare.cursor.min(firms.len().saturating_sub(1));
        self.compare.focus = self.compare.focus.min(self.compare.firms.len().saturating_sub(1));
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.dataset.date_bounds()
    }

    // ─── Filter overlay ─────────────────────────────────────────────

    /// Rows listed in the focused filter section.
    pub fn filter_items(&self) -> Vec<String> {
        self.filter_items_for(self.filter_editor.focus)
    }

    pub fn filter_items_for(&self, section: FilterFocus) -> Vec<String> {
        let universe = &self.dataset.universe;
        match section {
            FilterFocus::SuperSector => std::iter::once(ALL_SUPER_SECTORS.to_string())
                .chain(universe.super_sector_names().into_iter().map(String::from))
                .collect(),
            FilterFocus::Sectors => self
                .filters
                .sector_options(universe)
                .into_iter()
                .map(String::from)
                .collect(),
            FilterFocus::Firms => self
                .filters
                .firm_options(universe)
                .into_iter()
                .map(String::from)
                .collect(),
            FilterFocus::Dates => vec!["Start".into(), "End".into()],
        }
    }

    pub fn is_filter_item_selected(&self, section: FilterFocus, item: &str) -> bool {
        match section {
            FilterFocus::SuperSector => match &self.filters.super_sector {
                Some(ss) => ss == item,
                None => item == ALL_SUPER_SECTORS,
            },
            FilterFocus::Sectors => self.filters.sectors.contains(item),
            FilterFocus::Firms => self.filters.firms.contains(item),
            FilterFocus::Dates => false,
        }
    }

    /// Space/Enter on the row under the cursor.
    pub fn activate_filter_item(&mut self) {
        let items = self.filter_items();
        let Some(item) = items.get(self.filter_editor.cursor) else {
            return;
        };
        let universe = &self.dataset.universe;
        match self.filter_editor.focus {
            FilterFocus::SuperSector => {
                let choice = (item != ALL_SUPER_SECTORS).then(|| item.clone());
                self.filters.set_super_sector(universe, choice);
            }
            FilterFocus::Sectors => self.filters.toggle_sector(universe, item),
            FilterFocus::Firms => self.filters.toggle_firm(item),
            FilterFocus::Dates => {}
        }
    }

    /// Select or clear every offered row of the focused section.
    pub fn set_all_filter_items(&mut self, select: bool) {
        let items = self.filter_items();
        match self.filter_editor.focus {
            FilterFocus::Sectors => {
                if select {
                    self.filters.sectors.extend(items);
                } else {
                    self.filters.sectors.clear();
                }
                self.filters.retain_known(&self.dataset.universe);
            }
            FilterFocus::Firms => {
                if select {
                    self.filters.firms.extend(items);
                } else {
                    self.filters.firms.clear();
                }
            }
            FilterFocus::SuperSector | FilterFocus::Dates => {}
        }
    }

    /// Shift the start (cursor row 0) or end (row 1) of the date range.
    pub fn shift_filter_date(&mut self, days: i64) {
        let Some(bounds) = self.date_bounds() else {
            return;
        };
        if self.filter_editor.cursor == 0 {
            self.filters.shift_start(days, bounds);
        } else {
            self.filters.shift_end(days, bounds);
        }
    }

    // ─── Compare (Performance / Risk) ───────────────────────────────

    pub fn compare_options(&self) -> Vec<&str> {
        self.dataset.universe.all_firms()
    }

    pub fn toggle_compare_at_cursor(&mut self) {
        let Some(firm) = self.compare_options().get(self.compare.cursor).map(|f| f.to_string())
        else {
            return;
        };
        if !self.compare.firms.remove(&firm) {
            self.compare.firms.insert(firm);
        }
        self.compare.focus = self.compare.focus.min(self.compare.firms.len().saturating_sub(1));
    }

    pub fn focused_compare_firm(&self) -> Option<&str> {
        self.compare
            .firms
            .iter()
            .nth(self.compare.focus)
            .map(String::as_str)
    }

    /// Matrix for the current level. With a super sector filter set, the
    /// sector matrix keeps only that super sector's sectors.
    pub fn correlation_matrix(&self) -> CorrelationMatrix {
        match self.correlation.level {
            GroupKey::Sector => match &self.filters.super_sector {
                Some(_) => {
                    let keep = self.filters.sector_options(&self.dataset.universe);
                    self.dataset.sector_correlation.restrict(&keep)
                }
                None => self.dataset.sector_correlation.clone(),
            },
            GroupKey::SuperSector => self.dataset.super_sector_correlation.clone(),
        }
    }

    // ─── Data browser ───────────────────────────────────────────────

    pub fn open_browser_entry(&mut self) {
        let Some(entry) = self.browser.selected_entry().map(String::from) else {
            return;
        };
        let path = self.dataset.output_dir.join(&entry);
        self.browser.scroll = 0;
        match artifacts::read_raw_csv(&path) {
            Ok(table) => {
                self.set_status(format!("{entry}: {} rows", table.rows.len()));
                self.browser.table = Some(table);
            }
            Err(e) => {
                self.browser.table = None;
                self.push_error(ErrorCategory::Data, e.to_string(), entry);
            }
        }
    }

    // ─── Export ─────────────────────────────────────────────────────

    /// The table(s) the active panel currently shows, filters applied.
    pub fn displayed_tables(&self) -> Result<Vec<DisplayedTable>> {
        let ds = &self.dataset;
        let tables = match self.active_panel {
            Panel::Summary => match self.summary_mode {
                SummaryMode::BySector => {
                    let changes = filters::filter_price_changes(&ds.price_changes, &self.filters);
                    vec![
                        DisplayedTable::from_rows("company_price_changes_filtered", &changes)?,
                        DisplayedTable::from_rows("sector_price_summary", &ds.sector_summary)?,
                    ]
                }
                SummaryMode::Movers => vec![
                    DisplayedTable::from_rows("top_movers", &ds.top_movers)?,
                    DisplayedTable::from_rows("bottom_movers", &ds.bottom_movers)?,
                ],
            },
            Panel::Performance => {
                let rows = filters::rows_for_firms(&ds.trend, &self.compare.firms);
                vec![DisplayedTable::from_rows("price_comparison", &rows)?]
            }
            Panel::Risk => {
                let daily = filters::daily_for_firms(&ds.daily, &self.compare.firms);
                let drawdowns: Vec<&FirmDrawdown> = ds
                    .drawdowns
                    .iter()
                    .filter(|d| self.compare.firms.contains(&d.firm))
                    .collect();
                vec![
                    DisplayedTable::from_rows("risk_daily_metrics", &daily)?,
                    DisplayedTable::from_rows("risk_max_drawdown", &drawdowns)?,
                ]
            }
            Panel::Correlation => {
                let name = match self.correlation.level {
                    GroupKey::Sector => SECTOR_CORRELATION,
                    GroupKey::SuperSector => SUPER_SECTOR_CORRELATION,
                };
                vec![DisplayedTable::from_matrix(&export_name(name), &self.correlation_matrix())?]
            }
            Panel::Data => match (&self.browser.table, self.browser.selected_entry()) {
                (Some(table), Some(entry)) => {
                    vec![DisplayedTable::new(export_name(entry), table.clone())]
                }
                _ => Vec::new(),
            },
            Panel::Help => Vec::new(),
        };
        Ok(tables)
    }

    /// `x`: write the displayed table(s) to the export directory.
    pub fn export_current(&mut self) {
        let result = self
            .displayed_tables()
            .and_then(|tables| export::export_tables(&self.export_dir, &tables));
        match result {
            Ok(paths) => {
                let names: Vec<String> = paths
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect();
                self.set_status(format!(
                    "Exported {} to {}",
                    names.join(", "),
                    self.export_dir.display()
                ));
            }
            Err(e) => {
                self.push_error(ErrorCategory::Export, format!("{e:#}"), self.active_panel.label().into());
            }
        }
    }
}

pub const ALL_SUPER_SECTORS: &str = "All Super Sectors";

/// `correlation_by_firm/Energy.csv` -> `correlation_by_firm_Energy`.
fn export_name(entry: &str) -> String {
    artifacts::file_stem(entry.trim_end_matches(".csv"))
}

/// Fixed tables first, then every per-sector firm matrix present on disk.
fn browser_entries(dataset: &Dataset) -> Vec<String> {
    let mut entries: Vec<String> = TABLE_FILES.iter().map(|s| s.to_string()).collect();
    let dir = dataset.output_dir.join(FIRM_CORRELATION_DIR);
    if let Ok(read) = std::fs::read_dir(&dir) {
        let mut firm_files: Vec<String> = read
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".csv"))
            .map(|n| format!("{FIRM_CORRELATION_DIR}/{n}"))
            .collect();
        firm_files.sort();
        entries.extend(firm_files);
    }
    entries
}
