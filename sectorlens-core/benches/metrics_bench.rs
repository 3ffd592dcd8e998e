//! Criterion benchmarks for the metrics engine and ranking.
//!
//! Benchmarks:
//! 1. Full metrics pass (returns, volatility, drawdown, correlations)
//! 2. Ranking over the full window

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sectorlens_core::domain::PriceRow;
use sectorlens_core::metrics::{MetricsConfig, MetricsEngine};
use sectorlens_core::ranking::{Ranker, RankingConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_rows(firms: usize, days: usize) -> Vec<PriceRow> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let mut rows = Vec::with_capacity(firms * days);
    for f in 0..firms {
        for d in 0..days {
            let close = 100.0 + ((d + f * 7) as f64 * 0.1).sin() * 10.0;
            rows.push(PriceRow {
                date: base_date + chrono::Duration::days(d as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                sector: format!("Sector {}", f % 12),
                super_sector: format!("Super {}", f % 4),
                firm: format!("Firm {f:03}"),
            });
        }
    }
    rows
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_metrics(c: &mut Criterion) {
    let rows = make_rows(200, 1260);
    let engine = MetricsEngine::new(MetricsConfig::default()).unwrap();

    let mut group = c.benchmark_group("metrics_engine");
    group.sample_size(10);
    group.bench_function("200_firms_1260_days", |b| {
        b.iter(|| engine.compute(black_box(&rows)))
    });
    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let rows = make_rows(200, 1260);
    let ranker = Ranker::new(RankingConfig::default()).unwrap();

    c.bench_function("ranking_full_window", |b| {
        b.iter(|| ranker.rank(black_box(&rows)))
    });
}

criterion_group!(benches, bench_metrics, bench_ranking);
criterion_main!(benches);
