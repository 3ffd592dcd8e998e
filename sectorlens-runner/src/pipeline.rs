//! Pipeline runner: wires loading, cleaning, metrics and ranking to the
//! flat-file layout.
//!
//! Entry points:
//! - `run_pipeline()`: every stage in order, then the run manifest. Used by `sectorlens run`.
//! - `run_clean()`, `run_metrics()`, `run_ranking()`: one stage each. The
//!   later two read the cleaned table written by a previous clean.
//!
//! Each stage writes its whole output before the next stage reads it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;

use sectorlens_core::data::{CleanReport, CleanedTable, Cleaner, DataError, DataIngestor};
use sectorlens_core::domain::PriceRow;
use sectorlens_core::metrics::{MetricsEngine, MetricsError, MetricsOutput};
use sectorlens_core::ranking::{Ranker, RankingError, RankingOutput};

use crate::artifacts::{self, write_matrix, write_table, ArtifactError, OutputLayout};
use crate::config::{ConfigError, PipelineConfig};
use crate::manifest::{dataset_hash, RunManifest, SCHEMA_VERSION};

/// Errors from the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),
    #[error("ranking error: {0}")]
    Ranking(#[from] RankingError),
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Row counts per written file, keyed by path relative to the output dir.
pub type TableCounts = BTreeMap<String, usize>;

/// Result of the cleaning stage.
#[derive(Debug, Clone)]
pub struct CleanStage {
    pub table: CleanedTable,
    pub report: CleanReport,
    pub source_files: Vec<PathBuf>,
    pub tables: TableCounts,
}

#[derive(Debug, Clone)]
pub struct MetricsStage {
    pub output: MetricsOutput,
    pub tables: TableCounts,
}

#[derive(Debug, Clone)]
pub struct RankingStage {
    pub output: RankingOutput,
    pub tables: TableCounts,
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub manifest: RunManifest,
    pub output_dir: PathBuf,
}

// ─── Stages ─────────────────────────────────────────────────────────

/// Load the raw input, clean it and write `cleaned_data.csv`.
pub fn run_clean(config: &PipelineConfig) -> Result<CleanStage, PipelineError> {
    config.validate()?;
    let layout = OutputLayout::new(&config.output_dir);
    layout.ensure()?;

    let raw = DataIngestor::new().load(&config.input)?;
    let (table, report) = Cleaner::new(config.clean_options()).clean(&raw.records);

    let mut tables = TableCounts::new();
    record(
        &mut tables,
        artifacts::CLEANED_DATA,
        write_table(&layout.file(artifacts::CLEANED_DATA), &table.rows)?,
    );

    Ok(CleanStage {
        table,
        report,
        source_files: raw.source_files,
        tables,
    })
}

/// Read back the cleaned table of a previous clean stage.
pub fn load_cleaned(config: &PipelineConfig) -> Result<CleanedTable, PipelineError> {
    let layout = OutputLayout::new(&config.output_dir);
    let rows: Vec<PriceRow> = artifacts::read_table(&layout.file(artifacts::CLEANED_DATA))?;
    Ok(CleanedTable::from_rows(rows))
}

/// Compute and write every metrics table.
pub fn run_metrics(config: &PipelineConfig, rows: &[PriceRow]) -> Result<MetricsStage, PipelineError> {
    let engine = MetricsEngine::new(config.metrics_config())?;
    let output = engine.compute(rows);
    let tables = write_metrics(&OutputLayout::new(&config.output_dir), &output)?;
    Ok(MetricsStage { output, tables })
}

/// Compute and write every ranking table.
pub fn run_ranking(config: &PipelineConfig, rows: &[PriceRow]) -> Result<RankingStage, PipelineError> {
    let ranker = Ranker::new(config.ranking_config())?;
    let output = ranker.rank(rows);
    let tables = write_ranking(&OutputLayout::new(&config.output_dir), &output)?;
    Ok(RankingStage { output, tables })
}

/// Run every stage and write the manifest.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    let started_at = Utc::now();
    tracing::info!(
        input = %config.input.display(),
        output = %config.output_dir.display(),
        "pipeline started"
    );

    let clean = run_clean(config)?;
    let metrics = run_metrics(config, &clean.table.rows)?;
    let ranking = run_ranking(config, &clean.table.rows)?;

    let mut tables = clean.tables.clone();
    tables.extend(metrics.tables);
    tables.extend(ranking.tables);

    let (window_start, window_end) = ranking.output.window.unzip();
    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        started_at,
        finished_at: Utc::now(),
        config: config.clone(),
        config_hash: config.config_hash(),
        source_files: clean.source_files,
        dataset_hash: dataset_hash(&clean.table.rows),
        clean_report: clean.report,
        window_start,
        window_end,
        tables,
    };

    let layout = OutputLayout::new(&config.output_dir);
    manifest.save(&layout.manifest())?;
    tracing::info!(
        tables = manifest.tables.len(),
        secs = manifest.duration_secs(),
        "pipeline finished"
    );

    Ok(PipelineReport {
        manifest,
        output_dir: config.output_dir.clone(),
    })
}

// ─── Writers ────────────────────────────────────────────────────────

pub fn write_metrics(layout: &OutputLayout, out: &MetricsOutput) -> Result<TableCounts, ArtifactError> {
    layout.ensure()?;
    let mut t = TableCounts::new();

    let f = artifacts::DAILY_METRICS;
    record(&mut t, f, write_table(&layout.file(f), &out.daily)?);
    let f = artifacts::MONTHLY_RETURNS;
    record(&mut t, f, write_table(&layout.file(f), &out.monthly_returns)?);
    let f = artifacts::DRAWDOWNS;
    record(&mut t, f, write_table(&layout.file(f), &out.drawdowns)?);
    let f = artifacts::FIRM_SUMMARY;
    record(&mut t, f, write_table(&layout.file(f), &out.firm_summaries)?);
    let f = artifacts::SECTOR_PERFORMANCE;
    record(&mut t, f, write_table(&layout.file(f), &out.sector_performance)?);
    let f = artifacts::SUPER_SECTOR_PERFORMANCE;
    record(&mut t, f, write_table(&layout.file(f), &out.super_sector_performance)?);
    let f = artifacts::SUPER_SECTOR_TOTAL_RETURN;
    record(&mut t, f, write_table(&layout.file(f), &out.super_sector_total_return)?);
    let f = artifacts::SECTOR_CORRELATION;
    record(&mut t, f, write_matrix(&layout.file(f), &out.sector_correlation)?);
    let f = artifacts::SUPER_SECTOR_CORRELATION;
    record(&mut t, f, write_matrix(&layout.file(f), &out.super_sector_correlation)?);

    for (sector, matrix) in &out.firm_correlation {
        let path = layout.firm_correlation(sector);
        let n = write_matrix(&path, matrix)?;
        let name = path
            .strip_prefix(layout.root())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| path.to_string_lossy().into_owned());
        record(&mut t, &name, n);
    }

    Ok(t)
}

pub fn write_ranking(layout: &OutputLayout, out: &RankingOutput) -> Result<TableCounts, ArtifactError> {
    layout.ensure()?;
    let mut t = TableCounts::new();

    let f = artifacts::PRICE_CHANGES;
    record(&mut t, f, write_table(&layout.file(f), &out.price_changes)?);
    let f = artifacts::SECTOR_PRICE_SUMMARY;
    record(&mut t, f, write_table(&layout.file(f), &out.sector_summary)?);
    let f = artifacts::TOP_MOVERS;
    record(&mut t, f, write_table(&layout.file(f), &out.top_movers)?);
    let f = artifacts::BOTTOM_MOVERS;
    record(&mut t, f, write_table(&layout.file(f), &out.bottom_movers)?);
    let f = artifacts::PRICE_TREND;
    record(&mut t, f, write_table(&layout.file(f), &out.trend)?);
    let f = artifacts::SECTOR_PRICE_TREND;
    record(&mut t, f, write_table(&layout.file(f), &out.sector_trend)?);
    let f = artifacts::SUPER_SECTOR_PRICE_TREND;
    record(&mut t, f, write_table(&layout.file(f), &out.super_sector_trend)?);

    Ok(t)
}

fn record(tables: &mut TableCounts, name: &str, rows: usize) {
    tables.insert(name.to_string(), rows);
}
