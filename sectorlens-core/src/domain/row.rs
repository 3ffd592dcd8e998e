//! The cleaned daily price row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day for one firm, after cleaning.
///
/// Invariants upheld by the cleaning stage: `close > 0`, all prices finite,
/// labels non-empty, and `(firm, date)` unique within a cleaned table.
/// Field order is the column order of `cleaned_data.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PriceRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub sector: String,
    pub super_sector: String,
    pub firm: String,
}

impl PriceRow {
    /// Ordering key used before any within-firm temporal computation.
    pub fn firm_date_key(&self) -> (&str, NaiveDate) {
        (self.firm.as_str(), self.date)
    }
}
