//! SectorLens Runner - pipeline orchestration, configuration, flat-file artifacts.
//!
//! This crate builds on `sectorlens-core` to provide:
//! - TOML pipeline configuration with validation
//! - Stage runners (clean, metrics, ranking) and the full pipeline
//! - The fixed output layout with atomic CSV writes and matrix files
//! - Run manifest with dataset hashing
//! - Deterministic synthetic raw files in the scraper's layout

pub mod artifacts;
pub mod config;
pub mod manifest;
pub mod pipeline;
pub mod synthetic;

pub use artifacts::{ArtifactError, OutputLayout, RawCsv};
pub use config::{ConfigError, PipelineConfig};
pub use manifest::{RunManifest, SCHEMA_VERSION};
pub use pipeline::{
    load_cleaned, run_clean, run_metrics, run_pipeline, run_ranking, CleanStage, MetricsStage,
    PipelineError, PipelineReport, RankingStage,
};
pub use synthetic::{write_raw_files, SyntheticConfig};
