//! Raw table loader: CSV or Parquet files into text records.
//!
//! Every required column is read as text. Type coercion, and the decision
//! to drop a row, belong to the cleaning stage.

use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::data::schema::{RawColumn, RawSchema, SchemaError};

/// One raw row. `None` marks a null or absent cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub date: Option<String>,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub sector: Option<String>,
    pub super_sector: Option<String>,
    pub firm: Option<String>,
}

/// Concatenation of every raw file read for one run.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
    pub source_files: Vec<PathBuf>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Data ingestor for CSV and Parquet files
pub struct DataIngestor;

impl DataIngestor {
    pub fn new() -> Self {
        Self
    }

    /// Load a single raw file, or every `*.csv` / `*.parquet` file in a
    /// directory (sorted by file name) concatenated in that order.
    pub fn load(&self, path: &Path) -> Result<RawTable, DataError> {
        if !path.exists() {
            return Err(DataError::MissingInput(path.to_path_buf()));
        }

        let files = if path.is_dir() {
            let files = list_raw_files(path)?;
            if files.is_empty() {
                return Err(DataError::NoInputFiles(path.to_path_buf()));
            }
            files
        } else {
            vec![path.to_path_buf()]
        };

        let mut table = RawTable::default();
        for file in files {
            let records = self.ingest_file(&file)?;
            tracing::debug!(file = %file.display(), rows = records.len(), "loaded raw file");
            table.records.extend(records);
            table.source_files.push(file);
        }

        tracing::info!(
            files = table.source_files.len(),
            rows = table.records.len(),
            "raw table loaded"
        );
        Ok(table)
    }

    /// Read one file and validate its header against the raw schema.
    pub fn ingest_file(&self, path: &Path) -> Result<Vec<RawRecord>, DataError> {
        let df = read_frame(path)?;
        records_from_frame(&df).map_err(|e| match e {
            FrameError::Schema(source) => DataError::Schema {
                path: path.to_path_buf(),
                source,
            },
            FrameError::Polars(reason) => DataError::IngestFailed {
                path: path.to_path_buf(),
                reason,
            },
        })
    }
}

impl Default for DataIngestor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Input path does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("No raw files (*.csv, *.parquet) found in {}", .0.display())]
    NoInputFiles(PathBuf),

    #[error("Ingest failed for {}: {reason}", .path.display())]
    IngestFailed { path: PathBuf, reason: String },

    #[error("{}: {source}", .path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
}

enum FrameError {
    Schema(SchemaError),
    Polars(String),
}

impl From<PolarsError> for FrameError {
    fn from(e: PolarsError) -> Self {
        FrameError::Polars(e.to_string())
    }
}

fn list_raw_files(dir: &Path) -> Result<Vec<PathBuf>, DataError> {
    let io_err = |e: std::io::Error| DataError::IngestFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && raw_extension(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawFormat {
    Csv,
    Parquet,
}

fn raw_extension(path: &Path) -> Option<RawFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(RawFormat::Csv),
        "parquet" => Some(RawFormat::Parquet),
        _ => None,
    }
}

fn read_frame(path: &Path) -> Result<DataFrame, DataError> {
    let failed = |e: String| DataError::IngestFailed {
        path: path.to_path_buf(),
        reason: e,
    };

    match raw_extension(path) {
        Some(RawFormat::Parquet) => {
            let file = fs::File::open(path).map_err(|e| failed(e.to_string()))?;
            ParquetReader::new(file)
                .finish()
                .map_err(|e| failed(e.to_string()))
        }
        // Anything else is treated as CSV; schema length 0 reads all columns as text.
        _ => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| failed(e.to_string())),
    }
}

fn records_from_frame(df: &DataFrame) -> Result<Vec<RawRecord>, FrameError> {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let resolved = RawSchema::resolve(&headers).map_err(FrameError::Schema)?;

    let mut columns: Vec<Vec<Option<String>>> = Vec::with_capacity(RawColumn::ALL.len());
    for column in RawColumn::ALL {
        columns.push(text_column(df, &resolved[&column])?);
    }

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let mut cell = |c: usize| columns[c][i].take();
        records.push(RawRecord {
            date: cell(0),
            open: cell(1),
            high: cell(2),
            low: cell(3),
            close: cell(4),
            sector: cell(5),
            super_sector: cell(6),
            firm: cell(7),
        });
    }
    Ok(records)
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, FrameError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.as_materialized_series().str()?;
    Ok(values
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Date,Open,High,Low,Close,Sector,Industry,Firm";

    fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_csv_as_text_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "raw.csv",
            &format!("{HEADER}\n2024-01-02,10,11,9,10.5,Energy,Energy,ACME Co.\n"),
        );

        let table = DataIngestor::new().load(&path).unwrap();
        assert_eq!(table.len(), 1);
        let r = &table.records[0];
        assert_eq!(r.date.as_deref(), Some("2024-01-02"));
        assert_eq!(r.close.as_deref(), Some("10.5"));
        assert_eq!(r.super_sector.as_deref(), Some("Energy"));
        assert_eq!(r.firm.as_deref(), Some("ACME Co."));
    }

    #[test]
    fn quoted_delimiters_stay_in_their_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "raw.csv",
            &format!(
                "{HEADER}\n2024-01-02,10,11,9,10.5,\"Food,& Beverages\",Consumer Staples,\"& Beverages,ACME Co.\"\n"
            ),
        );

        let table = DataIngestor::new().load(&path).unwrap();
        assert_eq!(table.records[0].sector.as_deref(), Some("Food,& Beverages"));
        assert_eq!(table.records[0].firm.as_deref(), Some("& Beverages,ACME Co."));
    }

    #[test]
    fn directory_is_read_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "b_firm.csv",
            &format!("{HEADER}\n2024-01-02,1,1,1,1,S,SS,B\n"),
        );
        write_file(
            dir.path(),
            "a_firm.csv",
            &format!("{HEADER}\n2024-01-02,1,1,1,1,S,SS,A\n2024-01-03,1,1,1,1,S,SS,A\n"),
        );
        write_file(dir.path(), "notes.txt", "ignored");

        let table = DataIngestor::new().load(dir.path()).unwrap();
        assert_eq!(table.source_files.len(), 2);
        let firms: Vec<_> = table
            .records
            .iter()
            .map(|r| r.firm.clone().unwrap())
            .collect();
        assert_eq!(firms, vec!["A", "A", "B"]);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "raw.csv",
            "Date,Open,High,Low,Sector,Industry,Firm\n2024-01-02,1,1,1,S,SS,A\n",
        );

        let err = DataIngestor::new().load(&path).unwrap_err();
        match err {
            DataError::Schema { source, .. } => {
                assert!(matches!(source, SchemaError::MissingColumn(ref c) if c == "Close"))
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn empty_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataIngestor::new().load(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::NoInputFiles(_)));
    }
}
