//! Cleaning stage: raw text records into validated `PriceRow`s.
//!
//! Row-level problems never fail the stage. A bad row is dropped and
//! counted in the `CleanReport`; only schema errors (raised by the loader)
//! are fatal.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::data::ingest::RawRecord;
use crate::data::repair::RepairTable;
use crate::domain::PriceRow;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Knobs of the cleaning stage.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub repair: RepairTable,
    /// Calendar years to drop entirely (e.g. a partial final year).
    pub exclude_years: Vec<i32>,
    /// Turn scraper-style `Food_&_Beverages` labels back into spaces.
    pub normalize_underscores: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            repair: RepairTable::default_exchange(),
            exclude_years: Vec::new(),
            normalize_underscores: false,
        }
    }
}

/// Counters reported by one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    pub input_rows: usize,
    pub dropped_bad_date: usize,
    pub dropped_missing_price: usize,
    pub dropped_missing_label: usize,
    pub dropped_non_positive_close: usize,
    pub dropped_excluded_year: usize,
    pub duplicates_collapsed: usize,
    pub repaired_labels: usize,
    pub output_rows: usize,
}

impl CleanReport {
    pub fn dropped_total(&self) -> usize {
        self.dropped_bad_date
            + self.dropped_missing_price
            + self.dropped_missing_label
            + self.dropped_non_positive_close
            + self.dropped_excluded_year
    }
}

/// Cleaned table, sorted by (firm, date) with unique keys.
#[derive(Debug, Clone, Default)]
pub struct CleanedTable {
    pub rows: Vec<PriceRow>,
}

impl CleanedTable {
    /// Wrap rows that did not come from `Cleaner` (e.g. read back from disk),
    /// restoring the (firm, date) ordering.
    pub fn from_rows(mut rows: Vec<PriceRow>) -> Self {
        rows.sort_by(|a, b| a.firm_date_key().cmp(&b.firm_date_key()));
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest date present.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.iter().map(|r| r.date).min()?;
        let last = self.rows.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    pub fn firm_count(&self) -> usize {
        let mut n = 0;
        let mut prev: Option<&str> = None;
        for row in &self.rows {
            if prev != Some(row.firm.as_str()) {
                n += 1;
                prev = Some(row.firm.as_str());
            }
        }
        n
    }
}

pub struct Cleaner {
    options: CleanOptions,
}

impl Cleaner {
    pub fn new(options: CleanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    pub fn clean(&self, records: &[RawRecord]) -> (CleanedTable, CleanReport) {
        let mut report = CleanReport {
            input_rows: records.len(),
            ..Default::default()
        };

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            if let Some(row) = self.clean_record(record, &mut report) {
                rows.push(row);
            }
        }

        // Stable: among equal keys the input order survives, so the last
        // element of each run is the last-seen row.
        rows.sort_by(|a, b| a.firm_date_key().cmp(&b.firm_date_key()));
        let rows = keep_last_per_key(rows, &mut report);
        report.output_rows = rows.len();

        tracing::info!(
            input = report.input_rows,
            output = report.output_rows,
            bad_date = report.dropped_bad_date,
            missing_price = report.dropped_missing_price,
            missing_label = report.dropped_missing_label,
            non_positive_close = report.dropped_non_positive_close,
            excluded_year = report.dropped_excluded_year,
            duplicates = report.duplicates_collapsed,
            repaired = report.repaired_labels,
            "cleaning complete"
        );

        (CleanedTable { rows }, report)
    }

    fn clean_record(&self, record: &RawRecord, report: &mut CleanReport) -> Option<PriceRow> {
        let Some(date) = record.date.as_deref().and_then(parse_date) else {
            report.dropped_bad_date += 1;
            return None;
        };
        if self.options.exclude_years.contains(&date.year()) {
            report.dropped_excluded_year += 1;
            return None;
        }

        let prices = (
            parse_price(record.open.as_deref()),
            parse_price(record.high.as_deref()),
            parse_price(record.low.as_deref()),
            parse_price(record.close.as_deref()),
        );
        let (Some(open), Some(high), Some(low), Some(close)) = prices else {
            report.dropped_missing_price += 1;
            return None;
        };

        let mut sector = self.label(record.sector.as_deref());
        let super_sector = self.label(record.super_sector.as_deref());
        let mut firm = self.label(record.firm.as_deref());

        if let Some((fixed_sector, fixed_firm)) = self.options.repair.apply(&sector, &firm) {
            sector = fixed_sector;
            firm = fixed_firm;
            report.repaired_labels += 1;
        }

        if sector.is_empty() || super_sector.is_empty() || firm.is_empty() {
            report.dropped_missing_label += 1;
            return None;
        }
        if close <= 0.0 {
            report.dropped_non_positive_close += 1;
            return None;
        }

        Some(PriceRow {
            date,
            open,
            high,
            low,
            close,
            sector,
            super_sector,
            firm,
        })
    }

    fn label(&self, raw: Option<&str>) -> String {
        let text = raw.unwrap_or("").trim();
        if self.options.normalize_underscores {
            text.replace("&_", "& ").replace('_', " ").trim().to_string()
        } else {
            text.to_string()
        }
    }
}

fn keep_last_per_key(rows: Vec<PriceRow>, report: &mut CleanReport) -> Vec<PriceRow> {
    let mut out: Vec<PriceRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match out.last_mut() {
            Some(prev) if prev.firm_date_key() == row.firm_date_key() => {
                *prev = row;
                report.duplicates_collapsed += 1;
            }
            _ => out.push(row),
        }
    }
    out
}

/// Parse a calendar date, ignoring any time-of-day suffix.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split(['T', ' ']).next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

/// Strict numeric coercion. Empty, non-numeric and non-finite are missing.
pub fn parse_price(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, close: &str, sector: &str, firm: &str) -> RawRecord {
        RawRecord {
            date: Some(date.into()),
            open: Some("10".into()),
            high: Some("11".into()),
            low: Some("9".into()),
            close: Some(close.into()),
            sector: Some(sector.into()),
            super_sector: Some("Consumer Staples".into()),
            firm: Some(firm.into()),
        }
    }

    fn clean(records: &[RawRecord]) -> (CleanedTable, CleanReport) {
        Cleaner::new(CleanOptions::default()).clean(records)
    }

    #[test]
    fn date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 7, 4).unwrap();
        for raw in [
            "2023-07-04",
            "2023/07/04",
            "04-07-2023",
            "04/07/2023",
            "2023-07-04T00:00:00",
            "2023-07-04 00:00:00",
        ] {
            assert_eq!(parse_date(raw), Some(expected), "{raw}");
        }
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn price_coercion_is_strict() {
        assert_eq!(parse_price(Some(" 12.5 ")), Some(12.5));
        assert_eq!(parse_price(Some("abc")), None);
        assert_eq!(parse_price(Some("")), None);
        assert_eq!(parse_price(Some("NaN")), None);
        assert_eq!(parse_price(Some("inf")), None);
        assert_eq!(parse_price(None), None);
    }

    #[test]
    fn drops_are_counted_per_reason() {
        let mut missing_label = rec("2024-01-03", "10", "Energy", "B");
        missing_label.super_sector = None;
        let records = vec![
            rec("2024-01-02", "10", "Energy", "A"),
            rec("not a date", "10", "Energy", "A"),
            rec("2024-01-03", "", "Energy", "A"),
            rec("2024-01-04", "0", "Energy", "A"),
            rec("2024-01-05", "-3", "Energy", "A"),
            rec("2024-01-06", "10", "   ", "A"),
            missing_label,
        ];
        let (table, report) = clean(&records);

        assert_eq!(table.len(), 1);
        assert_eq!(report.input_rows, 7);
        assert_eq!(report.dropped_bad_date, 1);
        assert_eq!(report.dropped_missing_price, 1);
        assert_eq!(report.dropped_non_positive_close, 2);
        assert_eq!(report.dropped_missing_label, 2);
        assert_eq!(report.output_rows, 1);
        assert_eq!(report.dropped_total() + report.output_rows, report.input_rows);
    }

    #[test]
    fn duplicates_keep_last_seen_row() {
        let records = vec![
            rec("2024-01-02", "10", "Energy", "A"),
            rec("2024-01-02", "12", "Energy", "A"),
            rec("2024-01-02", "14", "Energy", "A"),
        ];
        let (table, report) = clean(&records);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].close, 14.0);
        assert_eq!(report.duplicates_collapsed, 2);
    }

    #[test]
    fn output_sorted_by_firm_then_date() {
        let records = vec![
            rec("2024-01-03", "10", "Energy", "B"),
            rec("2024-01-02", "10", "Energy", "B"),
            rec("2024-01-05", "10", "Energy", "A"),
            rec("2024-01-04", "10", "Energy", "A"),
        ];
        let (table, _) = clean(&records);
        let keys: Vec<_> = table
            .rows
            .iter()
            .map(|r| (r.firm.clone(), r.date.to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("A".to_string(), "2024-01-04".to_string()),
                ("A".to_string(), "2024-01-05".to_string()),
                ("B".to_string(), "2024-01-02".to_string()),
                ("B".to_string(), "2024-01-03".to_string()),
            ]
        );
        assert_eq!(table.firm_count(), 2);
    }

    #[test]
    fn misplaced_comma_is_repaired() {
        let records = vec![rec(
            "2024-01-02",
            "10",
            "Food,& Beverages",
            "& Beverages,ACME Co.",
        )];
        let (table, report) = clean(&records);
        assert_eq!(table.rows[0].sector, "Food & Beverages");
        assert_eq!(table.rows[0].firm, "ACME Co.");
        assert_eq!(report.repaired_labels, 1);
    }

    #[test]
    fn underscore_normalisation_is_opt_in() {
        let records = vec![rec("2024-01-02", "10", "Food_&_Beverages", "Almarai_Co.")];

        let (plain, _) = clean(&records);
        assert_eq!(plain.rows[0].sector, "Food_&_Beverages");

        let options = CleanOptions {
            normalize_underscores: true,
            ..Default::default()
        };
        let (table, _) = Cleaner::new(options).clean(&records);
        assert_eq!(table.rows[0].sector, "Food & Beverages");
        assert_eq!(table.rows[0].firm, "Almarai Co.");
    }

    #[test]
    fn excluded_years_are_dropped() {
        let records = vec![
            rec("2024-12-31", "10", "Energy", "A"),
            rec("2025-01-01", "10", "Energy", "A"),
        ];
        let options = CleanOptions {
            exclude_years: vec![2025],
            ..Default::default()
        };
        let (table, report) = Cleaner::new(options).clean(&records);
        assert_eq!(table.len(), 1);
        assert_eq!(report.dropped_excluded_year, 1);
        assert_eq!(
            table.date_range(),
            Some((
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
            ))
        );
    }
}
