//! Load a finished run's output tables by their fixed file names.
//!
//! Each table loads independently. A missing or unreadable file leaves that
//! table empty and is reported as a [`LoadIssue`], so one bad file never
//! blanks the whole dashboard.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use sectorlens_core::data::Universe;
use sectorlens_core::domain::{
    CorrelationMatrix, DailyMetricRow, FirmDrawdown, GroupPricePoint, MoverSummary, PriceRow,
    SectorSummary,
};
use sectorlens_runner::artifacts::{
    self, ArtifactError, BOTTOM_MOVERS, DAILY_METRICS, DRAWDOWNS, PRICE_CHANGES, PRICE_TREND,
    SECTOR_CORRELATION, SECTOR_PRICE_SUMMARY, SECTOR_PRICE_TREND, SUPER_SECTOR_CORRELATION,
    SUPER_SECTOR_PRICE_TREND, TOP_MOVERS,
};
use sectorlens_runner::{OutputLayout, RunManifest};

/// A table that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadIssue {
    pub file: String,
    pub message: String,
}

/// Every table the dashboard panels draw from.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub output_dir: PathBuf,
    pub price_changes: Vec<MoverSummary>,
    pub sector_summary: Vec<SectorSummary>,
    pub top_movers: Vec<MoverSummary>,
    pub bottom_movers: Vec<MoverSummary>,
    pub trend: Vec<PriceRow>,
    pub sector_trend: Vec<GroupPricePoint>,
    pub super_sector_trend: Vec<GroupPricePoint>,
    pub daily: Vec<DailyMetricRow>,
    pub drawdowns: Vec<FirmDrawdown>,
    pub sector_correlation: CorrelationMatrix,
    pub super_sector_correlation: CorrelationMatrix,
    pub manifest: Option<RunManifest>,
    /// Hierarchy of every firm present in the trend and price change tables.
    pub universe: Universe,
}

impl Dataset {
    pub fn load(output_dir: &Path) -> (Self, Vec<LoadIssue>) {
        let layout = OutputLayout::new(output_dir);
        let mut issues = Vec::new();

        let mut ds = Dataset {
            output_dir: output_dir.to_path_buf(),
            price_changes: table(&layout, PRICE_CHANGES, &mut issues),
            sector_summary: table(&layout, SECTOR_PRICE_SUMMARY, &mut issues),
            top_movers: table(&layout, TOP_MOVERS, &mut issues),
            bottom_movers: table(&layout, BOTTOM_MOVERS, &mut issues),
            trend: table(&layout, PRICE_TREND, &mut issues),
            sector_trend: table(&layout, SECTOR_PRICE_TREND, &mut issues),
            super_sector_trend: table(&layout, SUPER_SECTOR_PRICE_TREND, &mut issues),
            daily: table(&layout, DAILY_METRICS, &mut issues),
            drawdowns: table(&layout, DRAWDOWNS, &mut issues),
            sector_correlation: matrix(&layout, SECTOR_CORRELATION, &mut issues),
            super_sector_correlation: matrix(&layout, SUPER_SECTOR_CORRELATION, &mut issues),
            manifest: None,
            universe: Universe::default(),
        };

        let manifest_path = layout.manifest();
        if manifest_path.exists() {
            match RunManifest::load(&manifest_path) {
                Ok(m) => ds.manifest = Some(m),
                Err(e) => issues.push(issue(artifacts::MANIFEST, &e)),
            }
        }

        ds.rebuild_universe();
        (ds, issues)
    }

    /// Tables with no rows at all: nothing has been run into this directory.
    pub fn is_empty(&self) -> bool {
        self.price_changes.is_empty() && self.trend.is_empty() && self.daily.is_empty()
    }

    pub fn rebuild_universe(&mut self) {
        let mut universe = Universe::from_rows(&self.trend);
        for m in &self.price_changes {
            universe.insert(&m.super_sector, &m.sector, &m.firm);
        }
        self.universe = universe;
    }

    /// First and last trend date.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.trend.iter().map(|r| r.date).min()?;
        let last = self.trend.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    pub fn max_drawdown_of(&self, firm: &str) -> Option<f64> {
        self.drawdowns
            .iter()
            .find(|d| d.firm == firm)
            .map(|d| d.max_drawdown)
    }
}

fn issue(file: &str, err: &ArtifactError) -> LoadIssue {
    LoadIssue {
        file: file.to_string(),
        message: err.to_string(),
    }
}

fn table<T: DeserializeOwned>(
    layout: &OutputLayout,
    name: &str,
    issues: &mut Vec<LoadIssue>,
) -> Vec<T> {
    let path = layout.file(name);
    if !path.exists() {
        issues.push(LoadIssue {
            file: name.to_string(),
            message: "file not found".into(),
        });
        return Vec::new();
    }
    artifacts::read_table(&path).unwrap_or_else(|e| {
        issues.push(issue(name, &e));
        Vec::new()
    })
}

fn matrix(layout: &OutputLayout, name: &str, issues: &mut Vec<LoadIssue>) -> CorrelationMatrix {
    let path = layout.file(name);
    if !path.exists() {
        issues.push(LoadIssue {
            file: name.to_string(),
            message: "file not found".into(),
        });
        return CorrelationMatrix::empty();
    }
    artifacts::read_matrix(&path).unwrap_or_else(|e| {
        issues.push(issue(name, &e));
        CorrelationMatrix::empty()
    })
}
