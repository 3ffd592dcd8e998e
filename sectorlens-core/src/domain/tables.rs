//! Derived tables produced once per run and written as flat files.
//!
//! Field order is column order; headers are PascalCase. Statistics that can be
//! undefined are stored as NaN and written as empty fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::nan_as_empty;

/// Per-firm price change over a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MoverSummary {
    pub firm: String,
    pub sector: String,
    pub super_sector: String,
    pub start_price: f64,
    pub end_price: f64,
    pub pct_change: f64,
}

/// Distribution of firm price changes within one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SectorSummary {
    pub sector: String,
    #[serde(with = "nan_as_empty")]
    pub mean_change: f64,
    #[serde(with = "nan_as_empty")]
    pub median_change: f64,
    #[serde(with = "nan_as_empty")]
    pub std_dev: f64,
    pub num_firms: usize,
}

/// Enriched daily row: the cleaned price plus the per-firm temporal metrics.
///
/// `daily_return` is absent on a firm's first observation and
/// `rolling_volatility` until the window has filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailyMetricRow {
    pub date: NaiveDate,
    pub firm: String,
    pub sector: String,
    pub super_sector: String,
    pub close: f64,
    pub daily_return: Option<f64>,
    pub rolling_volatility: Option<f64>,
    pub drawdown: f64,
}

/// Month-over-month change of the month's last close, per firm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonthlyReturn {
    pub firm: String,
    /// Calendar month as `YYYY-MM`.
    pub month: String,
    pub monthly_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FirmDrawdown {
    pub firm: String,
    #[serde(with = "nan_as_empty")]
    pub max_drawdown: f64,
}

/// Whole-history summary statistics for one firm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FirmSummary {
    pub firm: String,
    #[serde(with = "nan_as_empty")]
    pub return_mean: f64,
    #[serde(with = "nan_as_empty")]
    pub return_std: f64,
    #[serde(with = "nan_as_empty")]
    pub volatility_mean: f64,
    pub close_min: f64,
    pub close_max: f64,
    pub close_mean: f64,
}

/// Mean daily return of every observation in a group (sector or super sector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupPerformance {
    pub group: String,
    #[serde(with = "nan_as_empty")]
    pub mean_daily_return: f64,
}

/// Mean over a group's firms of their full-history total return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupTotalReturn {
    pub group: String,
    #[serde(with = "nan_as_empty")]
    pub mean_total_return: f64,
}

/// Mean close of a group's firms on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupPricePoint {
    pub date: NaiveDate,
    pub group: String,
    pub mean_close: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_statistics_round_trip_through_empty_fields() {
        let summary = SectorSummary {
            sector: "Banks".into(),
            mean_change: 12.5,
            median_change: 12.5,
            std_dev: f64::NAN,
            num_firms: 1,
        };
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(&summary).unwrap();
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "Sector,MeanChange,MedianChange,StdDev,NumFirms\nBanks,12.5,12.5,,1\n"
        );

        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let back: SectorSummary = rdr.deserialize().next().unwrap().unwrap();
        assert!(back.std_dev.is_nan());
        assert_eq!(back.num_firms, 1);
    }

    #[test]
    fn absent_return_is_written_empty() {
        let row = DailyMetricRow {
            date: NaiveDate::from_ymd_opt(2021, 1, 3).unwrap(),
            firm: "A".into(),
            sector: "S".into(),
            super_sector: "SS".into(),
            close: 100.0,
            daily_return: None,
            rolling_volatility: None,
            drawdown: 0.0,
        };
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(&row).unwrap();
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert!(text.ends_with("2021-01-03,A,S,SS,100.0,,,0.0\n"));
    }
}
