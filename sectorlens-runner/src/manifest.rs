//! Run manifest: provenance and row counts of one pipeline run.
//!
//! Persisted as `manifest.json` next to the tables. The manifest carries a
//! `schema_version`; manifests from a newer version are rejected on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sectorlens_core::data::CleanReport;
use sectorlens_core::domain::PriceRow;

use crate::artifacts::{write_atomic, ArtifactError};
use crate::config::PipelineConfig;

pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config: PipelineConfig,
    pub config_hash: String,
    pub source_files: Vec<PathBuf>,
    /// BLAKE3 over the cleaned rows.
    pub dataset_hash: String,
    pub clean_report: CleanReport,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    /// Data rows per written file, keyed by path relative to the output dir.
    pub tables: BTreeMap<String, usize>,
}

impl RunManifest {
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomic(path, json.as_bytes())
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let json = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Self =
            serde_json::from_str(&json).map_err(|source| ArtifactError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if manifest.schema_version > SCHEMA_VERSION {
            return Err(ArtifactError::Malformed {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported schema version {} (max supported: {})",
                    manifest.schema_version, SCHEMA_VERSION
                ),
            });
        }
        Ok(manifest)
    }
}

/// Content hash of a cleaned table.
///
/// Covers every field of every row in table order; the cleaned table is
/// already sorted by (firm, date), so equal data gives an equal hash.
pub fn dataset_hash(rows: &[PriceRow]) -> String {
    let mut hasher = blake3::Hasher::new();
    for row in rows {
        update_text(&mut hasher, &row.firm);
        update_text(&mut hasher, &row.sector);
        update_text(&mut hasher, &row.super_sector);
        update_text(&mut hasher, &row.date.to_string());
        hasher.update(&row.open.to_le_bytes());
        hasher.update(&row.high.to_le_bytes());
        hasher.update(&row.low.to_le_bytes());
        hasher.update(&row.close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Length-prefixed so adjacent text fields cannot trade bytes.
fn update_text(hasher: &mut blake3::Hasher, text: &str) {
    hasher.update(&(text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
}
