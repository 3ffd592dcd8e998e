//! Per-firm and per-group summary tables.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::stats::{max, mean, min, sample_std};
use crate::domain::{
    DailyMetricRow, FirmSummary, GroupKey, GroupPerformance, GroupTotalReturn, PriceRow,
};

/// Descending order with NaN last.
pub fn desc_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Ascending order with NaN last.
pub fn asc_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

/// Summary of one firm's enriched daily rows.
pub fn firm_summary(firm: &str, rows: &[DailyMetricRow]) -> FirmSummary {
    let returns: Vec<f64> = rows.iter().filter_map(|r| r.daily_return).collect();
    let vols: Vec<f64> = rows.iter().filter_map(|r| r.rolling_volatility).collect();
    let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();

    FirmSummary {
        firm: firm.to_string(),
        return_mean: mean(&returns),
        return_std: sample_std(&returns),
        volatility_mean: mean(&vols),
        close_min: min(&closes),
        close_max: max(&closes),
        close_mean: mean(&closes),
    }
}

/// Mean of every defined daily return in each group, best first.
pub fn group_performance(rows: &[DailyMetricRow], key: GroupKey) -> Vec<GroupPerformance> {
    let mut returns: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        let group = key.pick(&row.sector, &row.super_sector);
        let bucket = returns.entry(group).or_default();
        if let Some(r) = row.daily_return {
            bucket.push(r);
        }
    }

    let mut out: Vec<GroupPerformance> = returns
        .into_iter()
        .map(|(group, values)| GroupPerformance {
            group: group.to_string(),
            mean_daily_return: mean(&values),
        })
        .collect();
    out.sort_by(|a, b| desc_nan_last(a.mean_daily_return, b.mean_daily_return));
    out
}

/// Per super sector, the mean over its firms of
/// `(last_close - first_close) / first_close` across the full history.
///
/// `rows` must be sorted by (firm, date).
pub fn super_sector_total_return(rows: &[PriceRow]) -> Vec<GroupTotalReturn> {
    let mut first_last: BTreeMap<(&str, &str), (f64, f64)> = BTreeMap::new();
    for row in rows {
        first_last
            .entry((row.firm.as_str(), row.super_sector.as_str()))
            .and_modify(|(_, last)| *last = row.close)
            .or_insert((row.close, row.close));
    }

    let mut by_group: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for ((_, group), (first, last)) in first_last {
        by_group
            .entry(group)
            .or_default()
            .push((last - first) / first);
    }

    let mut out: Vec<GroupTotalReturn> = by_group
        .into_iter()
        .map(|(group, totals)| GroupTotalReturn {
            group: group.to_string(),
            mean_total_return: mean(&totals),
        })
        .collect();
    out.sort_by(|a, b| desc_nan_last(a.mean_total_return, b.mean_total_return));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn price(day: u32, firm: &str, super_sector: &str, close: f64) -> PriceRow {
        PriceRow {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            sector: "S".into(),
            super_sector: super_sector.into(),
            firm: firm.into(),
        }
    }

    #[test]
    fn nan_sorts_last_in_both_directions() {
        let mut v = vec![f64::NAN, 1.0, 3.0, 2.0];
        v.sort_by(|a, b| desc_nan_last(*a, *b));
        assert_eq!(&v[..3], &[3.0, 2.0, 1.0]);
        assert!(v[3].is_nan());

        v.sort_by(|a, b| asc_nan_last(*a, *b));
        assert_eq!(&v[..3], &[1.0, 2.0, 3.0]);
        assert!(v[3].is_nan());
    }

    #[test]
    fn total_return_averages_firms() {
        let rows = vec![
            price(2, "A", "Energy", 100.0),
            price(3, "A", "Energy", 120.0),
            price(2, "B", "Energy", 50.0),
            price(3, "B", "Energy", 40.0),
            price(2, "C", "Materials", 10.0),
            price(3, "C", "Materials", 15.0),
        ];
        let out = super_sector_total_return(&rows);
        assert_eq!(out[0].group, "Materials");
        assert!((out[0].mean_total_return - 0.5).abs() < 1e-12);
        assert_eq!(out[1].group, "Energy");
        assert!((out[1].mean_total_return - 0.0).abs() < 1e-12);
    }

    #[test]
    fn firm_summary_with_single_row_is_nan_for_returns() {
        let row = DailyMetricRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            firm: "A".into(),
            sector: "S".into(),
            super_sector: "SS".into(),
            close: 7.0,
            daily_return: None,
            rolling_volatility: None,
            drawdown: 0.0,
        };
        let s = firm_summary("A", &[row]);
        assert!(s.return_mean.is_nan());
        assert!(s.return_std.is_nan());
        assert!(s.volatility_mean.is_nan());
        assert_eq!(s.close_min, 7.0);
        assert_eq!(s.close_max, 7.0);
    }
}
