//! Pairwise-complete correlation of group return series.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::stats::pearson;
use crate::domain::{CorrelationMatrix, DailyMetricRow, GroupKey};

/// Observations keyed by date. Dates with no defined value are absent.
pub type DatedSeries = BTreeMap<NaiveDate, f64>;

/// Collapse rows to one mean daily return per (date, label).
///
/// Every label seen in `rows` gets an entry, even when none of its rows
/// carries a return, so all-missing groups stay visible downstream.
pub fn mean_return_series<'a, I, F>(rows: I, label: F) -> BTreeMap<String, DatedSeries>
where
    I: IntoIterator<Item = &'a DailyMetricRow>,
    F: Fn(&DailyMetricRow) -> &str,
{
    let mut acc: BTreeMap<String, BTreeMap<NaiveDate, (f64, usize)>> = BTreeMap::new();
    for row in rows {
        let by_date = acc.entry(label(row).to_string()).or_default();
        if let Some(r) = row.daily_return.filter(|r| r.is_finite()) {
            let slot = by_date.entry(row.date).or_insert((0.0, 0));
            slot.0 += r;
            slot.1 += 1;
        }
    }

    acc.into_iter()
        .map(|(label, by_date)| {
            let series = by_date
                .into_iter()
                .map(|(date, (sum, n))| (date, sum / n as f64))
                .collect();
            (label, series)
        })
        .collect()
}

/// Pearson correlation over the date intersection of two series.
pub fn paired_correlation(a: &DatedSeries, b: &DatedSeries) -> f64 {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (date, x) in a {
        if let Some(y) = b.get(date) {
            xs.push(*x);
            ys.push(*y);
        }
    }
    pearson(&xs, &ys)
}

/// Square matrix over every labelled series, in label order.
///
/// Each off-diagonal pair is computed once and mirrored, so the result is
/// exactly symmetric. The diagonal is 1.0 for a series with at least two
/// observations and NaN otherwise.
pub fn correlation_matrix(series: &BTreeMap<String, DatedSeries>) -> CorrelationMatrix {
    let labels: Vec<String> = series.keys().cloned().collect();
    let columns: Vec<&DatedSeries> = series.values().collect();
    let n = labels.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        if columns[i].is_empty() {
            tracing::warn!(group = %labels[i], "no return observations, correlations are NaN");
        }
        values[i][i] = if columns[i].len() >= 2 { 1.0 } else { f64::NAN };
        for j in (i + 1)..n {
            let r = paired_correlation(columns[i], columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix::new(labels, values)
}

/// Group-level matrix (sector or super sector) of mean daily returns.
pub fn group_correlation(rows: &[DailyMetricRow], key: GroupKey) -> CorrelationMatrix {
    let series = mean_return_series(rows, |row| key.pick(&row.sector, &row.super_sector));
    correlation_matrix(&series)
}

/// One firm-by-firm matrix per sector.
pub fn firm_correlations_by_sector(rows: &[DailyMetricRow]) -> BTreeMap<String, CorrelationMatrix> {
    let mut by_sector: BTreeMap<&str, Vec<&DailyMetricRow>> = BTreeMap::new();
    for row in rows {
        by_sector.entry(row.sector.as_str()).or_default().push(row);
    }

    by_sector
        .into_iter()
        .map(|(sector, members)| {
            let series = mean_return_series(members, |row| row.firm.as_str());
            (sector.to_string(), correlation_matrix(&series))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn metric(day: u32, firm: &str, sector: &str, super_sector: &str, r: Option<f64>) -> DailyMetricRow {
        DailyMetricRow {
            date: d(day),
            firm: firm.into(),
            sector: sector.into(),
            super_sector: super_sector.into(),
            close: 1.0,
            daily_return: r,
            rolling_volatility: None,
            drawdown: 0.0,
        }
    }

    #[test]
    fn super_sector_example_matches_pearson() {
        let a = [0.01, 0.02, -0.01];
        let b = [0.02, 0.01, -0.02];
        let mut rows = Vec::new();
        for (i, (ra, rb)) in a.iter().zip(b.iter()).enumerate() {
            rows.push(metric(2 + i as u32, "FA", "S1", "A", Some(*ra)));
            rows.push(metric(2 + i as u32, "FB", "S2", "B", Some(*rb)));
        }

        let m = group_correlation(&rows, GroupKey::SuperSector);
        let expected = pearson(&a, &b);
        assert!((m.get("A", "B").unwrap() - expected).abs() < 1e-9);
        assert_eq!(m.get("A", "A"), Some(1.0));
        assert!(m.is_symmetric(1e-9));
    }

    #[test]
    fn firms_are_averaged_within_a_group() {
        let rows = vec![
            metric(2, "F1", "S", "SS", Some(0.02)),
            metric(2, "F2", "S", "SS", Some(0.04)),
            metric(3, "F1", "S", "SS", None),
        ];
        let series = mean_return_series(&rows, |r| r.sector.as_str());
        assert_eq!(series["S"].len(), 1);
        assert!((series["S"][&d(2)] - 0.03).abs() < 1e-12);
    }

    #[test]
    fn only_overlapping_dates_are_paired() {
        let mut a = DatedSeries::new();
        let mut b = DatedSeries::new();
        a.insert(d(1), 1.0);
        a.insert(d(2), 2.0);
        a.insert(d(3), 3.0);
        b.insert(d(2), 4.0);
        b.insert(d(3), 6.0);
        b.insert(d(4), -100.0);
        assert!((paired_correlation(&a, &b) - 1.0).abs() < 1e-12);

        b.remove(&d(3));
        assert!(paired_correlation(&a, &b).is_nan());
    }

    #[test]
    fn all_missing_group_is_surfaced_as_nan() {
        let rows = vec![
            metric(2, "F1", "S", "Live", Some(0.01)),
            metric(3, "F1", "S", "Live", Some(0.02)),
            metric(2, "F2", "S", "Dead", None),
        ];
        let m = group_correlation(&rows, GroupKey::SuperSector);
        assert_eq!(m.labels, vec!["Dead", "Live"]);
        assert!(m.get("Dead", "Dead").unwrap().is_nan());
        assert!(m.get("Dead", "Live").unwrap().is_nan());
        assert_eq!(m.get("Live", "Live"), Some(1.0));
    }

    #[test]
    fn firm_matrices_per_sector() {
        let rows = vec![
            metric(2, "F1", "S1", "SS", Some(0.01)),
            metric(3, "F1", "S1", "SS", Some(0.03)),
            metric(2, "F2", "S1", "SS", Some(0.02)),
            metric(3, "F2", "S1", "SS", Some(0.06)),
            metric(2, "F3", "S2", "SS", Some(0.02)),
        ];
        let by_sector = firm_correlations_by_sector(&rows);
        assert_eq!(by_sector.len(), 2);
        assert!((by_sector["S1"].get("F1", "F2").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(by_sector["S2"].labels, vec!["F3"]);
    }
}
