//! Ranking & trend extraction over an inclusive date window.

pub mod movers;
pub mod trend;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{GroupKey, GroupPricePoint, MoverSummary, PriceRow, SectorSummary};

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Inclusive window start; defaults to the earliest date in the data.
    pub start: Option<NaiveDate>,
    /// Inclusive window end; defaults to the latest date in the data.
    pub end: Option<NaiveDate>,
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("top_n must be at least 1")]
    InvalidTopN,

    #[error("window start {start} is after window end {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, Default)]
pub struct RankingOutput {
    /// Resolved window, `None` when there were no rows to rank.
    pub window: Option<(NaiveDate, NaiveDate)>,
    pub price_changes: Vec<MoverSummary>,
    pub sector_summary: Vec<SectorSummary>,
    pub top_movers: Vec<MoverSummary>,
    pub bottom_movers: Vec<MoverSummary>,
    pub trend: Vec<PriceRow>,
    pub sector_trend: Vec<GroupPricePoint>,
    pub super_sector_trend: Vec<GroupPricePoint>,
}

pub struct Ranker {
    config: RankingConfig,
}

impl Ranker {
    pub fn new(config: RankingConfig) -> Result<Self, RankingError> {
        if config.top_n == 0 {
            return Err(RankingError::InvalidTopN);
        }
        if let (Some(start), Some(end)) = (config.start, config.end) {
            if start > end {
                return Err(RankingError::InvertedWindow { start, end });
            }
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Window actually used for `rows`: configured bounds, each falling back
    /// to the data's own range.
    pub fn resolve_window(&self, rows: &[PriceRow]) -> Option<(NaiveDate, NaiveDate)> {
        let start = match self.config.start {
            Some(d) => d,
            None => rows.iter().map(|r| r.date).min()?,
        };
        let end = match self.config.end {
            Some(d) => d,
            None => rows.iter().map(|r| r.date).max()?,
        };
        (start <= end).then_some((start, end))
    }

    pub fn rank(&self, rows: &[PriceRow]) -> RankingOutput {
        let Some((start, end)) = self.resolve_window(rows) else {
            tracing::warn!("no rows to rank, ranking tables are empty");
            return RankingOutput::default();
        };

        let price_changes = movers::price_changes(rows, start, end);
        let top = movers::top_movers(&price_changes, self.config.top_n);
        let bottom = movers::bottom_movers(&price_changes, self.config.top_n, &top);
        let trend = trend::trend_rows(rows, start, end);

        if price_changes.is_empty() {
            tracing::warn!(%start, %end, "no rows fall inside the ranking window");
        }
        tracing::info!(
            %start,
            %end,
            firms = price_changes.len(),
            trend_rows = trend.len(),
            "ranking computed"
        );

        RankingOutput {
            window: Some((start, end)),
            sector_summary: movers::sector_summary(&price_changes),
            sector_trend: trend::group_price_trend(&trend, GroupKey::Sector),
            super_sector_trend: trend::group_price_trend(&trend, GroupKey::SuperSector),
            price_changes,
            top_movers: top,
            bottom_movers: bottom,
            trend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn row(day: u32, firm: &str, close: f64) -> PriceRow {
        PriceRow {
            date: d(day),
            open: close,
            high: close,
            low: close,
            close,
            sector: "S".into(),
            super_sector: "SS".into(),
            firm: firm.into(),
        }
    }

    #[test]
    fn config_validation() {
        assert!(Ranker::new(RankingConfig {
            top_n: 0,
            ..Default::default()
        })
        .is_err());
        assert!(Ranker::new(RankingConfig {
            start: Some(d(5)),
            end: Some(d(1)),
            top_n: 5,
        })
        .is_err());
    }

    #[test]
    fn default_window_is_full_range() {
        let rows = vec![row(3, "A", 1.0), row(9, "A", 2.0), row(5, "B", 1.0)];
        let ranker = Ranker::new(RankingConfig::default()).unwrap();
        assert_eq!(ranker.resolve_window(&rows), Some((d(3), d(9))));
    }

    #[test]
    fn half_open_configuration_falls_back_per_bound() {
        let rows = vec![row(3, "A", 1.0), row(9, "A", 2.0)];
        let ranker = Ranker::new(RankingConfig {
            start: Some(d(4)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ranker.resolve_window(&rows), Some((d(4), d(9))));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let out = Ranker::new(RankingConfig::default()).unwrap().rank(&[]);
        assert!(out.window.is_none());
        assert!(out.price_changes.is_empty());
    }

    #[test]
    fn movers_disjoint_with_enough_firms() {
        let mut rows = Vec::new();
        for i in 0..12u32 {
            let firm = format!("F{i:02}");
            rows.push(row(1, &firm, 100.0));
            rows.push(row(2, &firm, 100.0 + i as f64));
        }
        let out = Ranker::new(RankingConfig::default()).unwrap().rank(&rows);
        assert_eq!(out.top_movers.len(), 5);
        assert_eq!(out.bottom_movers.len(), 5);
        assert_eq!(out.top_movers[0].firm, "F11");
        assert_eq!(out.bottom_movers[0].firm, "F00");
        for t in &out.top_movers {
            assert!(out.bottom_movers.iter().all(|b| b.firm != t.firm));
        }
        assert_eq!(out.trend.len(), 24);
        assert_eq!(out.sector_trend.len(), 2);
    }
}
