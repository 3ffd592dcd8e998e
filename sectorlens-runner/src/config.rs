//! Serializable pipeline configuration.
//!
//! Loaded from TOML. Every section has defaults matching the reference run,
//! so an empty file is a valid configuration:
//!
//! ```toml
//! input = "data/raw"
//! output_dir = "outputs"
//!
//! [window]
//! start = "2020-01-01"
//! end = "2025-05-31"
//!
//! [metrics]
//! volatility_window = 30
//!
//! [ranking]
//! top_n = 5
//!
//! [cleaning]
//! exclude_years = [2025]
//! normalize_underscores = false
//!
//! [[cleaning.repair]]
//! bad_prefix = "Food,& Beverages"
//! sector = "Food & Beverages"
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sectorlens_core::data::{CleanOptions, RepairRule, RepairTable};
use sectorlens_core::metrics::{MetricsConfig, DEFAULT_VOLATILITY_WINDOW};
use sectorlens_core::ranking::{RankingConfig, DEFAULT_TOP_N};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("ranking.top_n must be at least 1")]
    InvalidTopN,

    #[error("metrics.volatility_window must be at least 2, got {0}")]
    InvalidVolatilityWindow(usize),

    #[error("window.start {start} is after window.end {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

/// Top-level configuration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw file, or a directory of raw `*.csv` / `*.parquet` files.
    pub input: PathBuf,
    /// Directory receiving every output table.
    pub output_dir: PathBuf,
    pub window: WindowConfig,
    pub metrics: MetricsSection,
    pub ranking: RankingSection,
    pub cleaning: CleaningSection,
}

/// Inclusive ranking window. Either bound may be omitted and then falls back
/// to the data's own range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSection {
    pub volatility_window: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSection {
    pub top_n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningSection {
    pub exclude_years: Vec<i32>,
    pub normalize_underscores: bool,
    /// Label repair rules, first match wins.
    pub repair: Vec<RepairRule>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("outputs"),
            window: WindowConfig::default(),
            metrics: MetricsSection::default(),
            ranking: RankingSection::default(),
            cleaning: CleaningSection::default(),
        }
    }
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
        }
    }
}

impl Default for RankingSection {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Default for CleaningSection {
    fn default() -> Self {
        Self {
            exclude_years: Vec::new(),
            normalize_underscores: false,
            repair: RepairTable::default_exchange().rules().to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ranking.top_n == 0 {
            return Err(ConfigError::InvalidTopN);
        }
        if self.metrics.volatility_window < 2 {
            return Err(ConfigError::InvalidVolatilityWindow(
                self.metrics.volatility_window,
            ));
        }
        if let (Some(start), Some(end)) = (self.window.start, self.window.end) {
            if start > end {
                return Err(ConfigError::InvertedWindow { start, end });
            }
        }
        Ok(())
    }

    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions {
            repair: RepairTable::new(self.cleaning.repair.clone()),
            exclude_years: self.cleaning.exclude_years.clone(),
            normalize_underscores: self.cleaning.normalize_underscores,
        }
    }

    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            volatility_window: self.metrics.volatility_window,
        }
    }

    pub fn ranking_config(&self) -> RankingConfig {
        RankingConfig {
            start: self.window.start,
            end: self.window.end,
            top_n: self.ranking.top_n,
        }
    }

    /// Deterministic content hash, recorded in the run manifest.
    pub fn config_hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
