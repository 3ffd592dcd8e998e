//! End-to-end checks of the documented worked examples through the core
//! stages: cleaning, metrics and ranking.

use chrono::NaiveDate;
use sectorlens_core::data::{CleanOptions, Cleaner, DataIngestor, RawRecord};
use sectorlens_core::metrics::{MetricsConfig, MetricsEngine};
use sectorlens_core::ranking::{Ranker, RankingConfig};

fn raw(date: &str, close: &str, sector: &str, super_sector: &str, firm: &str) -> RawRecord {
    RawRecord {
        date: Some(date.into()),
        open: Some(close.into()),
        high: Some(close.into()),
        low: Some(close.into()),
        close: Some(close.into()),
        sector: Some(sector.into()),
        super_sector: Some(super_sector.into()),
        firm: Some(firm.into()),
    }
}

#[test]
fn close_series_returns_and_drawdown() {
    let records = vec![
        raw("2024-01-02", "100", "Energy", "Energy", "A"),
        raw("2024-01-03", "110", "Energy", "Energy", "A"),
        raw("2024-01-04", "99", "Energy", "Energy", "A"),
    ];
    let (table, _) = Cleaner::new(CleanOptions::default()).clean(&records);
    let out = MetricsEngine::new(MetricsConfig::default())
        .unwrap()
        .compute(&table.rows);

    let returns: Vec<f64> = out.daily.iter().filter_map(|r| r.daily_return).collect();
    assert_eq!(returns.len(), 2);
    assert!((returns[0] - 0.10).abs() < 1e-12);
    assert!((returns[1] + 0.10).abs() < 1e-12);
    assert!((out.drawdowns[0].max_drawdown + 0.10).abs() < 1e-12);
}

#[test]
fn misplaced_comma_through_the_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.csv");
    std::fs::write(
        &path,
        "Date,Open,High,Low,Close,Sector,Industry,Firm\n\
         2024-01-02,1,1,1,1,\"Food,& Beverages\",Consumer Staples,\"& Beverages,ACME Co.\"\n",
    )
    .unwrap();

    let raw = DataIngestor::new().load(&path).unwrap();
    let (table, report) = Cleaner::new(CleanOptions::default()).clean(&raw.records);
    assert_eq!(report.repaired_labels, 1);
    assert_eq!(table.rows[0].sector, "Food & Beverages");
    assert_eq!(table.rows[0].firm, "ACME Co.");
    assert_eq!(table.rows[0].super_sector, "Consumer Staples");
}

#[test]
fn super_sector_correlation_example() {
    // Closes chosen so the per-day returns are exactly the listed values.
    let a = [0.01, 0.02, -0.01];
    let b = [0.02, 0.01, -0.02];
    let mut records = Vec::new();
    let (mut ca, mut cb) = (100.0_f64, 100.0_f64);
    records.push(raw("2024-01-01", &ca.to_string(), "S1", "A", "FA"));
    records.push(raw("2024-01-01", &cb.to_string(), "S2", "B", "FB"));
    for (i, (ra, rb)) in a.iter().zip(b.iter()).enumerate() {
        ca *= 1.0 + ra;
        cb *= 1.0 + rb;
        let date = format!("2024-01-0{}", i + 2);
        records.push(raw(&date, &ca.to_string(), "S1", "A", "FA"));
        records.push(raw(&date, &cb.to_string(), "S2", "B", "FB"));
    }

    let (table, _) = Cleaner::new(CleanOptions::default()).clean(&records);
    let out = MetricsEngine::new(MetricsConfig::default())
        .unwrap()
        .compute(&table.rows);
    let m = &out.super_sector_correlation;

    let expected = 48.0 / (42.0_f64 * 78.0).sqrt();
    assert!((m.get("A", "B").unwrap() - expected).abs() < 1e-9);
    assert_eq!(m.get("A", "A"), Some(1.0));
    assert_eq!(m.get("B", "B"), Some(1.0));
    assert!(m.is_symmetric(1e-9));
}

#[test]
fn ranking_over_configured_window() {
    let mut records = Vec::new();
    for (firm, closes) in [("A", [10.0, 20.0, 40.0]), ("B", [10.0, 5.0, 1.0])] {
        for (i, c) in closes.iter().enumerate() {
            records.push(raw(
                &format!("2024-02-0{}", i + 1),
                &c.to_string(),
                "Energy",
                "Energy",
                firm,
            ));
        }
    }
    let (table, _) = Cleaner::new(CleanOptions::default()).clean(&records);
    let ranker = Ranker::new(RankingConfig {
        start: NaiveDate::from_ymd_opt(2024, 2, 2),
        end: NaiveDate::from_ymd_opt(2024, 2, 3),
        top_n: 1,
    })
    .unwrap();
    let out = ranker.rank(&table.rows);

    assert_eq!(out.price_changes.len(), 2);
    assert!((out.price_changes[0].pct_change - 100.0).abs() < 1e-12);
    assert!((out.price_changes[1].pct_change + 80.0).abs() < 1e-12);
    assert_eq!(out.top_movers[0].firm, "A");
    assert_eq!(out.bottom_movers[0].firm, "B");
    assert_eq!(out.trend.len(), 4);
    assert_eq!(out.sector_summary[0].num_firms, 2);
    assert!(out.sector_trend.iter().all(|p| p.group == "Energy"));
    assert_eq!(out.sector_trend.len(), 2);
}

#[test]
fn movers_hold_five_rows_between_five_and_ten_firms() {
    for firm_count in 6..=9usize {
        let mut records = Vec::new();
        for i in 0..firm_count {
            let firm = format!("F{i}");
            records.push(raw("2024-03-03", "100", "Banks", "Financials", &firm));
            let end = (100 + i).to_string();
            records.push(raw("2024-03-04", &end, "Banks", "Financials", &firm));
        }
        let (table, _) = Cleaner::new(CleanOptions::default()).clean(&records);
        let out = Ranker::new(RankingConfig::default())
            .unwrap()
            .rank(&table.rows);

        assert_eq!(out.price_changes.len(), firm_count);
        assert_eq!(out.top_movers.len(), 5, "{firm_count} firms");
        assert_eq!(out.bottom_movers.len(), 5, "{firm_count} firms");

        let top: Vec<_> = out.top_movers.iter().map(|m| m.firm.clone()).collect();
        let expected_top: Vec<_> = (0..5).map(|k| format!("F{}", firm_count - 1 - k)).collect();
        assert_eq!(top, expected_top);

        let bottom: Vec<_> = out.bottom_movers.iter().map(|m| m.firm.clone()).collect();
        let expected_bottom: Vec<_> = (0..5).map(|k| format!("F{k}")).collect();
        assert_eq!(bottom, expected_bottom);
    }
}
