//! Flat-file artifacts: the fixed output layout, CSV table I/O and
//! correlation matrix files.
//!
//! Every write is a whole-file replacement: the content goes to a `.tmp`
//! sibling which is then renamed into place, so readers never observe a
//! partially written table.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use sectorlens_core::domain::CorrelationMatrix;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed table {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl ArtifactError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        ArtifactError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ─── Output layout ──────────────────────────────────────────────────

pub const CLEANED_DATA: &str = "cleaned_data.csv";
pub const DAILY_METRICS: &str = "daily_metrics.csv";
pub const MONTHLY_RETURNS: &str = "monthly_returns.csv";
pub const DRAWDOWNS: &str = "drawdowns.csv";
pub const FIRM_SUMMARY: &str = "firm_summary.csv";
pub const SECTOR_PERFORMANCE: &str = "sector_performance_summary.csv";
pub const SUPER_SECTOR_PERFORMANCE: &str = "super_sector_performance_summary.csv";
pub const SUPER_SECTOR_TOTAL_RETURN: &str = "super_sector_total_return.csv";
pub const PRICE_CHANGES: &str = "company_price_changes.csv";
pub const SECTOR_PRICE_SUMMARY: &str = "sector_price_summary.csv";
pub const TOP_MOVERS: &str = "top_movers.csv";
pub const BOTTOM_MOVERS: &str = "bottom_movers.csv";
pub const PRICE_TREND: &str = "price_trend_data.csv";
pub const SECTOR_PRICE_TREND: &str = "sector_price_trend.csv";
pub const SUPER_SECTOR_PRICE_TREND: &str = "super_sector_price_trend.csv";
pub const SECTOR_CORRELATION: &str = "correlation_by_sector.csv";
pub const SUPER_SECTOR_CORRELATION: &str = "correlation_by_super_sector.csv";
pub const FIRM_CORRELATION_DIR: &str = "correlation_by_firm";
pub const MANIFEST: &str = "manifest.json";

/// Every flat table of a run, in the order the dashboard's data browser
/// lists them.
pub const TABLE_FILES: [&str; 17] = [
    CLEANED_DATA,
    DAILY_METRICS,
    MONTHLY_RETURNS,
    DRAWDOWNS,
    FIRM_SUMMARY,
    SECTOR_PERFORMANCE,
    SUPER_SECTOR_PERFORMANCE,
    SUPER_SECTOR_TOTAL_RETURN,
    PRICE_CHANGES,
    SECTOR_PRICE_SUMMARY,
    TOP_MOVERS,
    BOTTOM_MOVERS,
    PRICE_TREND,
    SECTOR_PRICE_TREND,
    SUPER_SECTOR_PRICE_TREND,
    SECTOR_CORRELATION,
    SUPER_SECTOR_CORRELATION,
];

/// Fixed file names under one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn manifest(&self) -> PathBuf {
        self.file(MANIFEST)
    }

    pub fn firm_correlation_dir(&self) -> PathBuf {
        self.file(FIRM_CORRELATION_DIR)
    }

    /// Per-sector firm matrix, named by [`sector_file_stem`].
    pub fn firm_correlation(&self, sector: &str) -> PathBuf {
        self.firm_correlation_dir()
            .join(format!("{}.csv", sector_file_stem(sector)))
    }

    pub fn ensure(&self) -> Result<(), ArtifactError> {
        fs::create_dir_all(&self.root).map_err(|e| ArtifactError::io(&self.root, e))
    }
}

/// Filesystem-safe stem: anything but alphanumerics, `-` and `_` becomes `_`.
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `file_stem` plus the first 8 hex digits of the name's blake3 hash, so
/// names that sanitize alike ("A&B", "A B") still get distinct files.
pub fn sector_file_stem(sector: &str) -> String {
    let hash = blake3::hash(sector.as_bytes()).to_hex();
    format!("{}-{}", file_stem(sector), &hash.as_str()[..8])
}

// ─── Atomic writes ──────────────────────────────────────────────────

/// Replace `path` with `bytes` via a `.tmp` sibling and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ArtifactError::io(parent, e))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = PathBuf::from(tmp);

    fs::write(&tmp_path, bytes).map_err(|e| ArtifactError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        ArtifactError::io(path, e)
    })
}

// ─── CSV tables ─────────────────────────────────────────────────────

/// Serialize rows to CSV text with a header row from the row type.
pub fn rows_to_csv<T: Serialize>(rows: &[T]) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Write a whole table, returning the number of data rows written.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize, ArtifactError> {
    let text = rows_to_csv(rows).map_err(|e| ArtifactError::csv(path, e))?;
    write_atomic(path, text.as_bytes())?;
    tracing::debug!(file = %path.display(), rows = rows.len(), "table written");
    Ok(rows.len())
}

/// Read a whole table. Empty fields read back as missing values.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ArtifactError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| ArtifactError::csv(path, e))?;
    rdr.deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| ArtifactError::csv(path, e))
}

/// A table read without a row type: header plus string cells. The
/// dashboard's data browser uses this to show any output file as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCsv {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn read_raw_csv(path: &Path) -> Result<RawCsv, ArtifactError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| ArtifactError::csv(path, e))?;
    let headers = rdr
        .headers()
        .map_err(|e| ArtifactError::csv(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| ArtifactError::csv(path, e))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok(RawCsv { headers, rows })
}

/// Write string cells under a header, e.g. a filtered dashboard view.
pub fn write_raw_csv(path: &Path, table: &RawCsv) -> Result<usize, ArtifactError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&table.headers)
        .map_err(|e| ArtifactError::csv(path, e))?;
    for row in &table.rows {
        wtr.write_record(row).map_err(|e| ArtifactError::csv(path, e))?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| ArtifactError::io(path, e.into_error()))?;
    write_atomic(path, &data)?;
    Ok(table.rows.len())
}

// ─── Correlation matrices ───────────────────────────────────────────

/// Matrix as CSV: an empty first header cell followed by the labels, then
/// one row per label. NaN entries are written as empty fields.
pub fn matrix_to_csv(matrix: &CorrelationMatrix) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = Vec::with_capacity(matrix.len() + 1);
    header.push(String::new());
    header.extend(matrix.labels.iter().cloned());
    wtr.write_record(&header)?;

    for (label, row) in matrix.labels.iter().zip(&matrix.values) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(label.clone());
        record.extend(row.iter().map(|v| {
            if v.is_finite() {
                v.to_string()
            } else {
                String::new()
            }
        }));
        wtr.write_record(&record)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

pub fn write_matrix(path: &Path, matrix: &CorrelationMatrix) -> Result<usize, ArtifactError> {
    let text = matrix_to_csv(matrix).map_err(|e| ArtifactError::csv(path, e))?;
    write_atomic(path, text.as_bytes())?;
    Ok(matrix.len())
}

pub fn read_matrix(path: &Path) -> Result<CorrelationMatrix, ArtifactError> {
    let malformed = |reason: String| ArtifactError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let raw = read_raw_csv(path)?;
    let labels: Vec<String> = raw.headers.iter().skip(1).cloned().collect();
    if raw.rows.len() != labels.len() {
        return Err(malformed(format!(
            "{} labels but {} rows",
            labels.len(),
            raw.rows.len()
        )));
    }

    let mut values = Vec::with_capacity(labels.len());
    for (i, row) in raw.rows.iter().enumerate() {
        if row.first() != labels.get(i) {
            return Err(malformed(format!("row {i} label does not match header")));
        }
        let parsed: Result<Vec<f64>, _> = row
            .iter()
            .skip(1)
            .map(|cell| {
                let cell = cell.trim();
                if cell.is_empty() {
                    Ok(f64::NAN)
                } else {
                    cell.parse::<f64>()
                }
            })
            .collect();
        let parsed = parsed.map_err(|e| malformed(format!("row {i}: {e}")))?;
        if parsed.len() != labels.len() {
            return Err(malformed(format!("row {i} is not square")));
        }
        values.push(parsed);
    }

    Ok(CorrelationMatrix::new(labels, values))
}
