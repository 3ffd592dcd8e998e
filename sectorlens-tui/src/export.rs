//! Download: re-serialize the table currently on screen as comma-delimited
//! CSV into the export directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use sectorlens_core::domain::CorrelationMatrix;
use sectorlens_runner::artifacts::{self, RawCsv};

/// A named table as shown by a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedTable {
    /// File stem of the export, e.g. `company_price_changes_filtered`.
    pub name: String,
    pub table: RawCsv,
}

impl DisplayedTable {
    pub fn new(name: impl Into<String>, table: RawCsv) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }

    /// Typed rows through the same serializer as the pipeline's tables, so
    /// missing values stay blank.
    pub fn from_rows<T: Serialize>(name: &str, rows: &[T]) -> Result<Self> {
        let text = artifacts::rows_to_csv(rows).context("serializing displayed rows")?;
        Ok(Self::new(name, parse_csv(&text)?))
    }

    pub fn from_matrix(name: &str, matrix: &CorrelationMatrix) -> Result<Self> {
        let text = artifacts::matrix_to_csv(matrix).context("serializing matrix")?;
        Ok(Self::new(name, parse_csv(&text)?))
    }
}

fn parse_csv(text: &str) -> Result<RawCsv> {
    if text.is_empty() {
        return Ok(RawCsv::default());
    }
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    let headers = rdr.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        rows.push(record?.iter().map(String::from).collect());
    }
    Ok(RawCsv { headers, rows })
}

/// Write each table as `<export_dir>/<name>.csv`. Returns the written paths.
pub fn export_tables(export_dir: &Path, tables: &[DisplayedTable]) -> Result<Vec<PathBuf>> {
    if tables.iter().all(|t| t.table.headers.is_empty()) {
        bail!("nothing to export on this panel");
    }
    std::fs::create_dir_all(export_dir)
        .with_context(|| format!("creating export directory {}", export_dir.display()))?;

    let mut written = Vec::new();
    for t in tables.iter().filter(|t| !t.table.headers.is_empty()) {
        let path = export_dir.join(format!("{}.csv", t.name));
        artifacts::write_raw_csv(&path, &t.table)?;
        written.push(path);
    }
    Ok(written)
}
