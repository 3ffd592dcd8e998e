//! Metrics engine: per-firm temporal metrics and group aggregates.
//!
//! Input is a cleaned table (sorted by firm, then date). Each firm is
//! processed as one contiguous run; returns are taken between consecutive
//! available observations, so calendar gaps are tolerated.

pub mod correlation;
pub mod drawdown;
pub mod returns;
pub mod stats;
pub mod summary;
pub mod volatility;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    CorrelationMatrix, DailyMetricRow, FirmDrawdown, FirmSummary, GroupKey, GroupPerformance,
    GroupTotalReturn, MonthlyReturn, PriceRow,
};

pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Number of trailing return observations per volatility estimate.
    pub volatility_window: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("volatility window must be at least 2, got {0}")]
    InvalidWindow(usize),
}

/// Every table the engine derives from one cleaned table.
#[derive(Debug, Clone, Default)]
pub struct MetricsOutput {
    pub daily: Vec<DailyMetricRow>,
    pub monthly_returns: Vec<MonthlyReturn>,
    /// Worst first.
    pub drawdowns: Vec<FirmDrawdown>,
    pub firm_summaries: Vec<FirmSummary>,
    pub sector_performance: Vec<GroupPerformance>,
    pub super_sector_performance: Vec<GroupPerformance>,
    pub super_sector_total_return: Vec<GroupTotalReturn>,
    pub sector_correlation: CorrelationMatrix,
    pub super_sector_correlation: CorrelationMatrix,
    pub firm_correlation: BTreeMap<String, CorrelationMatrix>,
}

pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> Result<Self, MetricsError> {
        if config.volatility_window < 2 {
            return Err(MetricsError::InvalidWindow(config.volatility_window));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn compute(&self, rows: &[PriceRow]) -> MetricsOutput {
        let mut sorted: Vec<&PriceRow> = rows.iter().collect();
        sorted.sort_by(|a, b| a.firm_date_key().cmp(&b.firm_date_key()));
        let owned: Vec<PriceRow> = sorted.into_iter().cloned().collect();

        let mut out = MetricsOutput::default();
        for firm_rows in firm_runs(&owned) {
            let firm = firm_rows[0].firm.as_str();
            let daily = self.firm_daily(firm_rows);
            let closes: Vec<f64> = firm_rows.iter().map(|r| r.close).collect();

            out.drawdowns.push(FirmDrawdown {
                firm: firm.to_string(),
                max_drawdown: drawdown::max_drawdown(&closes),
            });
            out.firm_summaries.push(summary::firm_summary(firm, &daily));
            out.monthly_returns.extend(returns::monthly_returns(firm_rows));
            out.daily.extend(daily);
        }
        out.drawdowns
            .sort_by(|a, b| summary::asc_nan_last(a.max_drawdown, b.max_drawdown));

        out.sector_performance = summary::group_performance(&out.daily, GroupKey::Sector);
        out.super_sector_performance =
            summary::group_performance(&out.daily, GroupKey::SuperSector);
        out.super_sector_total_return = summary::super_sector_total_return(&owned);

        out.sector_correlation = correlation::group_correlation(&out.daily, GroupKey::Sector);
        out.super_sector_correlation =
            correlation::group_correlation(&out.daily, GroupKey::SuperSector);
        out.firm_correlation = correlation::firm_correlations_by_sector(&out.daily);

        tracing::info!(
            firms = out.firm_summaries.len(),
            daily_rows = out.daily.len(),
            monthly_rows = out.monthly_returns.len(),
            sectors = out.sector_correlation.len(),
            super_sectors = out.super_sector_correlation.len(),
            "metrics computed"
        );
        out
    }

    /// Enriched rows for one firm's date-ordered run.
    fn firm_daily(&self, rows: &[PriceRow]) -> Vec<DailyMetricRow> {
        let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
        let rets = returns::daily_returns(&closes);
        let vols = volatility::rolling_volatility(&rets, self.config.volatility_window);
        let dds = drawdown::drawdown_series(&closes);

        rows.iter()
            .enumerate()
            .map(|(i, row)| DailyMetricRow {
                date: row.date,
                firm: row.firm.clone(),
                sector: row.sector.clone(),
                super_sector: row.super_sector.clone(),
                close: row.close,
                daily_return: rets[i],
                rolling_volatility: vols[i],
                drawdown: dds[i],
            })
            .collect()
    }
}

/// Split rows sorted by firm into one contiguous slice per firm.
pub fn firm_runs(rows: &[PriceRow]) -> Vec<&[PriceRow]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=rows.len() {
        if i == rows.len() || rows[i].firm != rows[start].firm {
            runs.push(&rows[start..i]);
            start = i;
        }
    }
    runs
}
