//! Dashboard filters: super sector, sectors, firms and an inclusive date
//! range. Every projection here is a pure function of the loaded tables and
//! the current [`FilterState`]; nothing is recomputed from prices.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use sectorlens_core::data::Universe;
use sectorlens_core::domain::{DailyMetricRow, GroupPricePoint, MoverSummary, PriceRow};

/// Sectors preselected on first launch.
const SEED_SECTORS: usize = 2;
/// Firms preselected on first launch.
const SEED_FIRMS: usize = 4;

pub type Series<'a> = BTreeMap<&'a str, Vec<(NaiveDate, f64)>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// `None` offers the sectors of every super sector.
    pub super_sector: Option<String>,
    pub sectors: BTreeSet<String>,
    pub firms: BTreeSet<String>,
    /// `None` means the first available date.
    pub start: Option<NaiveDate>,
    /// `None` means the last available date.
    pub end: Option<NaiveDate>,
}

impl FilterState {
    /// A small starting selection so the first screen is not empty.
    pub fn seeded(universe: &Universe) -> Self {
        let sectors: BTreeSet<String> = universe
            .sector_names(None)
            .into_iter()
            .take(SEED_SECTORS)
            .map(String::from)
            .collect();
        let mut state = FilterState {
            sectors,
            ..Default::default()
        };
        state.firms = state
            .firm_options(universe)
            .into_iter()
            .take(SEED_FIRMS)
            .map(String::from)
            .collect();
        state
    }

    pub fn is_blank(&self) -> bool {
        self.sectors.is_empty() && self.firms.is_empty()
    }

    pub fn sector_options<'a>(&self, universe: &'a Universe) -> Vec<&'a str> {
        universe.sector_names(self.super_sector.as_deref())
    }

    /// Firms of the selected sectors only.
    pub fn firm_options<'a>(&self, universe: &'a Universe) -> Vec<&'a str> {
        let sectors: Vec<&str> = self.sectors.iter().map(String::as_str).collect();
        universe.firms_in_sectors(&sectors)
    }

    /// Change the super sector and drop selections it no longer offers.
    pub fn set_super_sector(&mut self, universe: &Universe, super_sector: Option<String>) {
        self.super_sector = super_sector;
        self.retain_known(universe);
    }

    pub fn toggle_sector(&mut self, universe: &Universe, sector: &str) {
        if !self.sectors.remove(sector) {
            self.sectors.insert(sector.to_string());
        }
        self.retain_known(universe);
    }

    pub fn toggle_firm(&mut self, firm: &str) {
        if !self.firms.remove(firm) {
            self.firms.insert(firm.to_string());
        }
    }

    /// Drop selections that are not offered by the current universe, e.g.
    /// after a rerun removed a firm or a restored state is stale.
    pub fn retain_known(&mut self, universe: &Universe) {
        if let Some(ss) = &self.super_sector {
            if !universe.super_sectors.contains_key(ss) {
                self.super_sector = None;
            }
        }
        let sectors: BTreeSet<String> = self
            .sector_options(universe)
            .into_iter()
            .map(String::from)
            .collect();
        self.sectors.retain(|s| sectors.contains(s));
        let firms: BTreeSet<String> = self
            .firm_options(universe)
            .into_iter()
            .map(String::from)
            .collect();
        self.firms.retain(|f| firms.contains(f));
    }

    /// Effective inclusive range given the data's first and last date.
    pub fn resolved_range(&self, bounds: (NaiveDate, NaiveDate)) -> (NaiveDate, NaiveDate) {
        (
            self.start.unwrap_or(bounds.0),
            self.end.unwrap_or(bounds.1),
        )
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// Move the start by `days`, staying within the data and not past the end.
    pub fn shift_start(&mut self, days: i64, bounds: (NaiveDate, NaiveDate)) {
        let (start, end) = self.resolved_range(bounds);
        let moved = start + Duration::days(days);
        self.start = Some(moved.max(bounds.0).min(end));
    }

    /// Move the end by `days`, staying within the data and not before the start.
    pub fn shift_end(&mut self, days: i64, bounds: (NaiveDate, NaiveDate)) {
        let (start, end) = self.resolved_range(bounds);
        let moved = end + Duration::days(days);
        self.end = Some(moved.min(bounds.1).max(start));
    }

    pub fn clear_range(&mut self) {
        self.start = None;
        self.end = None;
    }
}

/// Trend rows of the selected sectors and firms inside the date range.
pub fn filter_trend<'a>(rows: &'a [PriceRow], filter: &FilterState) -> Vec<&'a PriceRow> {
    rows.iter()
        .filter(|r| {
            filter.sectors.contains(&r.sector)
                && filter.firms.contains(&r.firm)
                && filter.contains_date(r.date)
        })
        .collect()
}

/// Price changes of the selected firms. The change itself is window-wide,
/// so the date range does not apply.
pub fn filter_price_changes<'a>(
    rows: &'a [MoverSummary],
    filter: &FilterState,
) -> Vec<&'a MoverSummary> {
    rows.iter().filter(|m| filter.firms.contains(&m.firm)).collect()
}

/// Group averages inside the date range, every group.
pub fn filter_group_trend<'a>(
    points: &'a [GroupPricePoint],
    filter: &FilterState,
) -> Vec<&'a GroupPricePoint> {
    points
        .iter()
        .filter(|p| filter.contains_date(p.date))
        .collect()
}

/// Close series per firm, in date order.
pub fn firm_close_series<'a>(rows: &[&'a PriceRow]) -> Series<'a> {
    let mut out: Series<'a> = BTreeMap::new();
    for r in rows {
        out.entry(r.firm.as_str()).or_default().push((r.date, r.close));
    }
    for points in out.values_mut() {
        points.sort_by_key(|(d, _)| *d);
    }
    out
}

pub fn group_close_series<'a>(points: &[&'a GroupPricePoint]) -> Series<'a> {
    let mut out: Series<'a> = BTreeMap::new();
    for p in points {
        out.entry(p.group.as_str())
            .or_default()
            .push((p.date, p.mean_close));
    }
    for points in out.values_mut() {
        points.sort_by_key(|(d, _)| *d);
    }
    out
}

/// Trend rows of an explicit firm set, whole history.
pub fn rows_for_firms<'a>(rows: &'a [PriceRow], firms: &BTreeSet<String>) -> Vec<&'a PriceRow> {
    rows.iter().filter(|r| firms.contains(&r.firm)).collect()
}

/// Daily metric rows of one firm in date order.
pub fn daily_for_firm<'a>(daily: &'a [DailyMetricRow], firm: &str) -> Vec<&'a DailyMetricRow> {
    let mut rows: Vec<&DailyMetricRow> = daily.iter().filter(|r| r.firm == firm).collect();
    rows.sort_by_key(|r| r.date);
    rows
}

/// Daily metric rows of an explicit firm set.
pub fn daily_for_firms<'a>(
    daily: &'a [DailyMetricRow],
    firms: &BTreeSet<String>,
) -> Vec<&'a DailyMetricRow> {
    daily.iter().filter(|r| firms.contains(&r.firm)).collect()
}
