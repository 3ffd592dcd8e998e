//! Property tests for metric and ranking invariants.
//!
//! Uses proptest to verify:
//! 1. Returns: first observation absent, one return per consecutive pair
//! 2. Rolling volatility: absent before the window fills, non-negative after
//! 3. Drawdown: never positive, zero exactly for non-decreasing closes
//! 4. Correlation: unit diagonal, symmetric matrices
//! 5. Movers: reproducible percent change, disjoint top/bottom lists
//! 6. Cleaning: sorted output with unique (firm, date) keys

use chrono::NaiveDate;
use proptest::prelude::*;
use sectorlens_core::data::{CleanOptions, Cleaner, RawRecord};
use sectorlens_core::domain::PriceRow;
use sectorlens_core::metrics::drawdown::max_drawdown;
use sectorlens_core::metrics::returns::daily_returns;
use sectorlens_core::metrics::volatility::rolling_volatility;
use sectorlens_core::metrics::{MetricsConfig, MetricsEngine};
use sectorlens_core::ranking::{Ranker, RankingConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_close() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_close(), 1..max_len)
}

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap() + chrono::Duration::days(i as i64)
}

fn rows_for(firm: &str, sector: &str, super_sector: &str, closes: &[f64]) -> Vec<PriceRow> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceRow {
            date: day(i),
            open: close,
            high: close,
            low: close,
            close,
            sector: sector.into(),
            super_sector: super_sector.into(),
            firm: firm.into(),
        })
        .collect()
}

// ── 1. Returns ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn first_return_absent_and_count_matches(closes in arb_closes(60)) {
        let r = daily_returns(&closes);
        prop_assert_eq!(r.len(), closes.len());
        prop_assert!(r[0].is_none());
        prop_assert_eq!(r.iter().filter(|v| v.is_some()).count(), closes.len() - 1);
    }
}

// ── 2. Rolling volatility ────────────────────────────────────────────

proptest! {
    #[test]
    fn volatility_absent_until_thirtieth_return(closes in arb_closes(90)) {
        let vol = rolling_volatility(&daily_returns(&closes), 30);
        for (i, v) in vol.iter().enumerate() {
            // Row i carries the i-th return.
            if i < 30 {
                prop_assert!(v.is_none(), "row {} has volatility before the window filled", i);
            } else {
                prop_assert!(v.is_some_and(|x| x >= 0.0), "row {} missing volatility", i);
            }
        }
    }
}

// ── 3. Drawdown ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn max_drawdown_is_never_positive(closes in prop::collection::vec(arb_close(), 2..80)) {
        prop_assert!(max_drawdown(&closes) <= 0.0);
    }

    #[test]
    fn zero_drawdown_iff_non_decreasing(closes in prop::collection::vec(arb_close(), 2..40)) {
        let non_decreasing = closes.windows(2).all(|w| w[1] >= w[0]);
        prop_assert_eq!(max_drawdown(&closes) == 0.0, non_decreasing);

        let mut sorted = closes.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        prop_assert_eq!(max_drawdown(&sorted), 0.0);
    }
}

// ── 4. Correlation ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn correlation_matrices_unit_diagonal_and_symmetric(
        firms in prop::collection::vec(prop::collection::vec(arb_close(), 3..30), 2..8)
    ) {
        let sectors = ["Banks", "Energy", "Materials"];
        let mut rows = Vec::new();
        for (i, closes) in firms.iter().enumerate() {
            let sector = sectors[i % sectors.len()];
            let super_sector = if i % 2 == 0 { "Financials" } else { "Industrials" };
            rows.extend(rows_for(&format!("F{i}"), sector, super_sector, closes));
        }

        let out = MetricsEngine::new(MetricsConfig::default()).unwrap().compute(&rows);
        for m in [&out.sector_correlation, &out.super_sector_correlation] {
            prop_assert!(m.is_symmetric(1e-9));
            for i in 0..m.len() {
                prop_assert_eq!(m.values[i][i], 1.0);
                for j in 0..m.len() {
                    let v = m.values[i][j];
                    prop_assert!(v.is_nan() || (-1.0..=1.0).contains(&v));
                }
            }
        }
        for m in out.firm_correlation.values() {
            prop_assert!(m.is_symmetric(1e-9));
        }
    }
}

// ── 5. Movers ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn pct_change_reproducible_and_movers_disjoint(
        firms in prop::collection::vec(arb_closes(20), 10..25)
    ) {
        let mut rows = Vec::new();
        for (i, closes) in firms.iter().enumerate() {
            rows.extend(rows_for(&format!("F{i:02}"), "S", "SS", closes));
        }

        let out = Ranker::new(RankingConfig::default()).unwrap().rank(&rows);
        prop_assert_eq!(out.price_changes.len(), firms.len());

        for m in &out.price_changes {
            let firm_rows: Vec<&PriceRow> = rows.iter().filter(|r| r.firm == m.firm).collect();
            let first = firm_rows.first().unwrap().close;
            let last = firm_rows.last().unwrap().close;
            prop_assert_eq!(m.start_price, first);
            prop_assert_eq!(m.end_price, last);
            prop_assert!((m.pct_change - (last - first) / first * 100.0).abs() < 1e-9);
        }

        prop_assert_eq!(out.top_movers.len(), 5);
        prop_assert_eq!(out.bottom_movers.len(), 5);
        for t in &out.top_movers {
            prop_assert!(out.bottom_movers.iter().all(|b| b.firm != t.firm));
        }
    }
}

// ── 6. Cleaning ──────────────────────────────────────────────────────

fn arb_record() -> impl Strategy<Value = RawRecord> {
    (0..4usize, 0..20usize, arb_close()).prop_map(|(firm, d, close)| RawRecord {
        date: Some(day(d).format("%Y-%m-%d").to_string()),
        open: Some(close.to_string()),
        high: Some(close.to_string()),
        low: Some(close.to_string()),
        close: Some(close.to_string()),
        sector: Some("Energy".into()),
        super_sector: Some("Energy".into()),
        firm: Some(format!("Firm {firm}")),
    })
}

proptest! {
    #[test]
    fn cleaned_rows_sorted_and_unique(records in prop::collection::vec(arb_record(), 0..120)) {
        let (table, report) = Cleaner::new(CleanOptions::default()).clean(&records);
        prop_assert_eq!(report.output_rows + report.duplicates_collapsed, records.len());
        for pair in table.rows.windows(2) {
            prop_assert!(pair[0].firm_date_key() < pair[1].firm_date_key());
        }
    }
}
