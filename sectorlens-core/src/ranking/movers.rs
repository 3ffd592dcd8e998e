//! Per-firm price change over a window, movers and sector distribution.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{MoverSummary, PriceRow, SectorSummary};
use crate::metrics::stats::{mean, median, sample_std};
use crate::metrics::summary::{asc_nan_last, desc_nan_last};

/// Percent change from the first to the last row of each firm inside
/// `[start, end]` (inclusive). Ordered by firm; firms without a row in
/// the window are absent.
pub fn price_changes(rows: &[PriceRow], start: NaiveDate, end: NaiveDate) -> Vec<MoverSummary> {
    let mut bounds: BTreeMap<&str, (&PriceRow, &PriceRow)> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.date >= start && r.date <= end) {
        bounds
            .entry(row.firm.as_str())
            .and_modify(|(first, last)| {
                if row.date < first.date {
                    *first = row;
                }
                if row.date > last.date {
                    *last = row;
                }
            })
            .or_insert((row, row));
    }

    bounds
        .into_iter()
        .map(|(firm, (first, last))| MoverSummary {
            firm: firm.to_string(),
            sector: last.sector.clone(),
            super_sector: last.super_sector.clone(),
            start_price: first.close,
            end_price: last.close,
            pct_change: pct_change(first.close, last.close),
        })
        .collect()
}

pub fn pct_change(start: f64, end: f64) -> f64 {
    (end - start) / start * 100.0
}

/// Largest gains first, `n` entries. Ties keep table order.
pub fn top_movers(changes: &[MoverSummary], n: usize) -> Vec<MoverSummary> {
    let mut sorted: Vec<&MoverSummary> = changes.iter().collect();
    sorted.sort_by(|a, b| desc_nan_last(a.pct_change, b.pct_change));
    sorted.into_iter().take(n).cloned().collect()
}

/// Largest losses first, `n` entries. Ties keep table order.
///
/// With at least `2n` firms, firms already in `top` are skipped so the two
/// lists never share a firm (equal changes would otherwise land in both).
/// With fewer firms the lists overlap and both still hold `n` rows.
pub fn bottom_movers(changes: &[MoverSummary], n: usize, top: &[MoverSummary]) -> Vec<MoverSummary> {
    let disjoint = changes.len() >= 2 * n;
    let mut sorted: Vec<&MoverSummary> = changes
        .iter()
        .filter(|m| !disjoint || !top.iter().any(|t| t.firm == m.firm))
        .collect();
    sorted.sort_by(|a, b| asc_nan_last(a.pct_change, b.pct_change));
    sorted.into_iter().take(n).cloned().collect()
}

/// Mean, median, sample std and count of price changes per sector.
pub fn sector_summary(changes: &[MoverSummary]) -> Vec<SectorSummary> {
    let mut by_sector: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for m in changes {
        by_sector.entry(m.sector.as_str()).or_default().push(m.pct_change);
    }

    by_sector
        .into_iter()
        .map(|(sector, values)| SectorSummary {
            sector: sector.to_string(),
            mean_change: mean(&values),
            median_change: median(&values),
            std_dev: sample_std(&values),
            num_firms: values.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn row(day: u32, firm: &str, sector: &str, close: f64) -> PriceRow {
        PriceRow {
            date: d(day),
            open: close,
            high: close,
            low: close,
            close,
            sector: sector.into(),
            super_sector: "SS".into(),
            firm: firm.into(),
        }
    }

    fn mover(firm: &str, pct: f64) -> MoverSummary {
        MoverSummary {
            firm: firm.into(),
            sector: "S".into(),
            super_sector: "SS".into(),
            start_price: 100.0,
            end_price: 100.0 + pct,
            pct_change: pct,
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let rows = vec![
            row(1, "A", "S", 50.0),
            row(2, "A", "S", 100.0),
            row(5, "A", "S", 125.0),
            row(6, "A", "S", 500.0),
        ];
        let changes = price_changes(&rows, d(2), d(5));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].start_price, 100.0);
        assert_eq!(changes[0].end_price, 125.0);
        assert!((changes[0].pct_change - 25.0).abs() < 1e-12);
    }

    #[test]
    fn single_row_in_window_is_zero_change() {
        let rows = vec![row(3, "A", "S", 42.0)];
        let changes = price_changes(&rows, d(1), d(9));
        assert_eq!(changes[0].pct_change, 0.0);
    }

    #[test]
    fn changes_ordered_by_firm() {
        let rows = vec![row(2, "Zed", "S", 1.0), row(2, "Alpha", "S", 1.0)];
        let changes = price_changes(&rows, d(1), d(9));
        let firms: Vec<_> = changes.iter().map(|m| m.firm.as_str()).collect();
        assert_eq!(firms, vec!["Alpha", "Zed"]);
    }

    #[test]
    fn ties_keep_table_order() {
        let changes = vec![mover("A", 5.0), mover("B", 5.0), mover("C", 1.0)];
        let top = top_movers(&changes, 2);
        assert_eq!(top[0].firm, "A");
        assert_eq!(top[1].firm, "B");
    }

    #[test]
    fn bottom_keeps_n_rows_when_firms_are_scarce() {
        let changes = vec![mover("A", 5.0), mover("B", -5.0), mover("C", 1.0)];
        let top = top_movers(&changes, 2);
        let bottom = bottom_movers(&changes, 2, &top);
        let firms: Vec<_> = bottom.iter().map(|m| m.firm.as_str()).collect();
        assert_eq!(firms, vec!["B", "C"]);
        assert!(top.iter().any(|t| t.firm == "C"));
    }

    #[test]
    fn equal_changes_stay_disjoint_with_enough_firms() {
        let changes: Vec<_> = ["A", "B", "C", "D"].iter().map(|f| mover(f, 0.0)).collect();
        let top = top_movers(&changes, 2);
        let bottom = bottom_movers(&changes, 2, &top);
        let firms: Vec<_> = bottom.iter().map(|m| m.firm.as_str()).collect();
        assert_eq!(firms, vec!["C", "D"]);
    }

    #[test]
    fn sector_summary_statistics() {
        let mut changes = vec![mover("A", 10.0), mover("B", 20.0), mover("C", 60.0)];
        changes.push(MoverSummary {
            sector: "Solo".into(),
            ..mover("D", 3.0)
        });
        let summary = sector_summary(&changes);
        assert_eq!(summary.len(), 2);

        let s = &summary[0];
        assert_eq!(s.sector, "S");
        assert_eq!(s.num_firms, 3);
        assert!((s.mean_change - 30.0).abs() < 1e-12);
        assert_eq!(s.median_change, 20.0);
        assert!((s.std_dev - 700.0f64.sqrt()).abs() < 1e-9);

        assert_eq!(summary[1].sector, "Solo");
        assert!(summary[1].std_dev.is_nan());
    }
}
