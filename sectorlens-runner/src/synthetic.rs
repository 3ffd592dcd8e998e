//! Deterministic synthetic raw files for development and tests.
//!
//! Mirrors the scraper's layout: one CSV per (sector, firm), named
//! `{Sector}_{Firm}.csv` with spaces replaced by underscores, using the
//! upstream `Industry` header for the super sector. Prices are a random walk
//! seeded from the firm name, so the same firm always gets the same series.
//! With `inject_defects` the files also carry the scraper's known defects:
//! sector names split at a comma and the occasional blank close.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::artifacts::{write_atomic, ArtifactError};

const RAW_HEADER: [&str; 8] = [
    "Date", "Open", "High", "Low", "Close", "Sector", "Industry", "Firm",
];

/// Super sector -> sectors of the synthetic market.
const HIERARCHY: [(&str, &[&str]); 11] = [
    ("Energy", &["Energy"]),
    ("Materials", &["Materials"]),
    (
        "Industrials",
        &["Capital Goods", "Commercial & Professional", "Transportation"],
    ),
    (
        "Consumer Discretionary",
        &[
            "Consumer Durables & Apparel",
            "Consumer Services",
            "Media and Entertainment",
            "Consumer Discretionary Distribution & Retail",
        ],
    ),
    (
        "Consumer Staples",
        &[
            "Consumer Staples Distribution & Retail",
            "Food & Beverages",
            "Household & Personal Products",
        ],
    ),
    (
        "Health Care",
        &["Health Care Equipment & Svc", "Pharma Biotech & Life Science"],
    ),
    ("Financials", &["Banks", "Financial Services", "Insurance"]),
    ("Information Technology", &["Software & Services"]),
    ("Telecommunication Services", &["Telecommunication Services"]),
    ("Utilities", &["Utilities"]),
    ("Real Estate", &["Real Estate Mgmt & Dev't"]),
];

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub firms_per_sector: usize,
    pub inject_defects: bool,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            firms_per_sector: 3,
            inject_defects: false,
        }
    }
}

/// One synthetic trading day before it is written as text.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Random walk on weekdays from a starting price of 100.0.
pub fn generate_bars(firm: &str, start: NaiveDate, end: NaiveDate) -> Vec<SyntheticBar> {
    let seed: [u8; 32] = *blake3::hash(firm.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let drift: f64 = rng.gen_range(-0.0005..0.0008);
    let mut bars = Vec::new();
    let mut price = rng.gen_range(20.0..150.0_f64);
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = drift + rng.gen_range(-0.03..0.03);
        let open = price;
        let close = (price * (1.0 + daily_return)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));

        bars.push(SyntheticBar {
            date: current,
            open,
            high,
            low,
            close,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

/// Firm name for the i-th firm of a sector.
pub fn firm_name(sector: &str, i: usize) -> String {
    let initials: String = sector
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .filter(|c| c.is_alphanumeric())
        .collect();
    format!("{initials} Holding Co. {}", i + 1)
}

/// How the scraper would have split `sector` at its first space, if the
/// sector is one it is known to break.
fn split_label(sector: &str, firm: &str) -> (String, String) {
    match sector.split_once(' ') {
        Some((head, tail)) => (head.to_string(), format!("{tail},{firm}")),
        None => (sector.to_string(), firm.to_string()),
    }
}

fn is_known_broken(sector: &str) -> bool {
    sectorlens_core::data::RepairTable::default_exchange()
        .rules()
        .iter()
        .any(|r| r.sector == sector)
}

/// Write every raw file into `dir`, returning the paths written.
pub fn write_raw_files(dir: &Path, config: &SyntheticConfig) -> Result<Vec<PathBuf>, ArtifactError> {
    let mut written = Vec::new();

    for (super_sector, sectors) in HIERARCHY {
        for sector in sectors.iter().copied() {
            for i in 0..config.firms_per_sector {
                let firm = firm_name(sector, i);
                let bars = generate_bars(&firm, config.start, config.end);
                let (sector_cell, firm_cell) = if config.inject_defects && is_known_broken(sector) {
                    split_label(sector, &firm)
                } else {
                    (sector.to_string(), firm.clone())
                };

                let path = dir.join(format!(
                    "{}_{}.csv",
                    sector.replace(' ', "_"),
                    firm.replace(' ', "_")
                ));
                let text = raw_csv(&bars, &sector_cell, super_sector, &firm_cell, config.inject_defects)
                    .map_err(|source| ArtifactError::Csv {
                        path: path.clone(),
                        source,
                    })?;
                write_atomic(&path, text.as_bytes())?;
                written.push(path);
            }
        }
    }

    tracing::info!(
        files = written.len(),
        dir = %dir.display(),
        defects = config.inject_defects,
        "synthetic raw files written"
    );
    Ok(written)
}

fn raw_csv(
    bars: &[SyntheticBar],
    sector: &str,
    super_sector: &str,
    firm: &str,
    inject_defects: bool,
) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(RAW_HEADER)?;
    for (i, bar) in bars.iter().enumerate() {
        let close = if inject_defects && i % 97 == 50 {
            String::new()
        } else {
            format!("{:.2}", bar.close)
        };
        wtr.write_record([
            bar.date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", bar.open),
            format!("{:.2}", bar.high),
            format!("{:.2}", bar.low),
            close,
            sector.to_string(),
            super_sector.to_string(),
            firm.to_string(),
        ])?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectorlens_core::data::{CleanOptions, Cleaner, DataIngestor};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn bars_are_deterministic_per_firm() {
        let a = generate_bars("Firm A", d(2024, 1, 1), d(2024, 3, 31));
        let b = generate_bars("Firm A", d(2024, 1, 1), d(2024, 3, 31));
        let c = generate_bars("Firm B", d(2024, 1, 1), d(2024, 3, 31));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn bars_skip_weekends_and_stay_positive() {
        let bars = generate_bars("Firm A", d(2024, 1, 1), d(2024, 12, 31));
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(bars.iter().all(|b| b.close > 0.0 && b.low <= b.high));
    }

    #[test]
    fn scraper_style_split_labels() {
        assert_eq!(
            split_label("Food & Beverages", "FB Holding Co. 1"),
            ("Food".to_string(), "& Beverages,FB Holding Co. 1".to_string())
        );
        assert!(is_known_broken("Capital Goods"));
        assert!(!is_known_broken("Banks"));
    }

    #[test]
    fn defective_files_clean_back_to_the_hierarchy() {
        let dir = tempfile::tempdir().unwrap();
        let config = SyntheticConfig {
            start: d(2024, 1, 1),
            end: d(2024, 6, 30),
            firms_per_sector: 1,
            inject_defects: true,
        };
        let files = write_raw_files(dir.path(), &config).unwrap();
        assert_eq!(files.len(), 21);

        let raw = DataIngestor::new().load(dir.path()).unwrap();
        let (table, report) = Cleaner::new(CleanOptions::default()).clean(&raw.records);

        assert!(report.repaired_labels > 0);
        assert!(report.dropped_missing_price > 0);
        assert!(table
            .rows
            .iter()
            .any(|r| r.sector == "Food & Beverages" && r.firm == "FB Holding Co. 1"));
        assert_eq!(table.firm_count(), 21);
    }
}
