//! SectorLens CLI - pipeline stages, synthetic data and run status.
//!
//! Commands:
//! - `run` - every stage: load, clean, metrics, ranking, manifest
//! - `clean` - load raw files and write the cleaned table
//! - `metrics` - compute metric tables from a previously cleaned table
//! - `rank` - compute movers and trend tables from a previously cleaned table
//! - `synth` - write deterministic synthetic raw files in the scraper layout
//! - `status` - summarize the manifest of a finished run

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sectorlens_core::data::CleanReport;
use sectorlens_runner::artifacts::TABLE_FILES;
use sectorlens_runner::{
    load_cleaned, run_clean, run_metrics, run_pipeline, run_ranking, write_raw_files,
    OutputLayout, PipelineConfig, RunManifest, SyntheticConfig,
};

#[derive(Parser)]
#[command(
    name = "sectorlens",
    about = "SectorLens CLI - sector analytics over daily exchange prices"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole pipeline and write the run manifest.
    Run(PipelineArgs),
    /// Load raw files and write the cleaned table.
    Clean(PipelineArgs),
    /// Compute metric tables from the cleaned table in the output directory.
    Metrics(PipelineArgs),
    /// Compute movers and trend tables from the cleaned table in the output directory.
    Rank(PipelineArgs),
    /// Write synthetic raw files, one per (sector, firm).
    Synth {
        /// Directory receiving the raw files.
        #[arg(long, default_value = "data/raw")]
        dir: PathBuf,

        /// First calendar day (YYYY-MM-DD).
        #[arg(long, default_value = "2020-01-01")]
        start: String,

        /// Last calendar day (YYYY-MM-DD).
        #[arg(long, default_value = "2024-12-31")]
        end: String,

        /// Firms generated per sector.
        #[arg(long, default_value_t = 3)]
        firms_per_sector: usize,

        /// Reproduce the scraper's defects (split sector names, blank closes).
        #[arg(long, default_value_t = false)]
        defects: bool,
    },
    /// Summarize the manifest of a finished run.
    Status {
        /// Output directory of the run.
        #[arg(long, default_value = "outputs")]
        output_dir: PathBuf,
    },
}

/// Config file plus flag overrides shared by the pipeline commands.
#[derive(Args)]
struct PipelineArgs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raw file or directory of raw files.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output directory for all tables.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Ranking window start (YYYY-MM-DD, inclusive).
    #[arg(long)]
    start: Option<String>,

    /// Ranking window end (YYYY-MM-DD, inclusive).
    #[arg(long)]
    end: Option<String>,

    /// Number of top and bottom movers.
    #[arg(long)]
    top_n: Option<usize>,

    /// Trailing return observations per volatility estimate.
    #[arg(long)]
    volatility_window: Option<usize>,

    /// Calendar year to drop while cleaning (repeatable).
    #[arg(long = "exclude-year")]
    exclude_years: Vec<i32>,
}

impl PipelineArgs {
    fn resolve(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(start) = self.start.as_deref() {
            config.window.start = Some(parse_date(start)?);
        }
        if let Some(end) = self.end.as_deref() {
            config.window.end = Some(parse_date(end)?);
        }
        if let Some(n) = self.top_n {
            config.ranking.top_n = n;
        }
        if let Some(w) = self.volatility_window {
            config.metrics.volatility_window = w;
        }
        if !self.exclude_years.is_empty() {
            config.cleaning.exclude_years = self.exclude_years;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_all_cmd(args.resolve()?),
        Commands::Clean(args) => run_clean_cmd(args.resolve()?),
        Commands::Metrics(args) => run_metrics_cmd(args.resolve()?),
        Commands::Rank(args) => run_rank_cmd(args.resolve()?),
        Commands::Synth {
            dir,
            start,
            end,
            firms_per_sector,
            defects,
        } => run_synth_cmd(dir, &start, &end, firms_per_sector, defects),
        Commands::Status { output_dir } => run_status(&output_dir),
    }
}

/// Structured logs on stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn run_all_cmd(config: PipelineConfig) -> Result<()> {
    let report = run_pipeline(&config)?;
    print_manifest(&report.manifest);
    println!("Outputs written to: {}", report.output_dir.display());
    Ok(())
}

fn run_clean_cmd(config: PipelineConfig) -> Result<()> {
    let stage = run_clean(&config)?;
    println!();
    println!("=== Clean ===");
    println!("Source files:   {}", stage.source_files.len());
    print_clean_report(&stage.report);
    println!("Firms:          {}", stage.table.firm_count());
    if let Some((first, last)) = stage.table.date_range() {
        println!("Dates:          {first} to {last}");
    }
    println!();
    Ok(())
}

fn run_metrics_cmd(config: PipelineConfig) -> Result<()> {
    let cleaned = load_cleaned(&config).context("no cleaned table; run `sectorlens clean` first")?;
    let stage = run_metrics(&config, &cleaned.rows)?;
    let out = &stage.output;

    println!();
    println!("=== Metrics ===");
    println!("Firms:          {}", out.firm_summaries.len());
    println!("Daily rows:     {}", out.daily.len());
    println!("Monthly rows:   {}", out.monthly_returns.len());
    println!("Sectors:        {}", out.sector_correlation.len());
    println!("Super sectors:  {}", out.super_sector_correlation.len());
    if let Some(worst) = out.drawdowns.first() {
        println!(
            "Worst drawdown: {} ({:.2}%)",
            worst.firm,
            worst.max_drawdown * 100.0
        );
    }
    if let Some(best) = out.super_sector_total_return.first() {
        println!(
            "Best super sector: {} ({:.2}% mean total return)",
            best.group,
            best.mean_total_return * 100.0
        );
    }
    println!();
    Ok(())
}

fn run_rank_cmd(config: PipelineConfig) -> Result<()> {
    let cleaned = load_cleaned(&config).context("no cleaned table; run `sectorlens clean` first")?;
    let stage = run_ranking(&config, &cleaned.rows)?;
    let out = &stage.output;

    println!();
    println!("=== Ranking ===");
    match out.window {
        Some((start, end)) => println!("Window:         {start} to {end}"),
        None => println!("Window:         (no data)"),
    }
    println!("Firms:          {}", out.price_changes.len());
    println!();
    println!("--- Top movers ---");
    for m in &out.top_movers {
        println!("  {:<40} {:>9.2}%", m.firm, m.pct_change);
    }
    println!("--- Bottom movers ---");
    for m in &out.bottom_movers {
        println!("  {:<40} {:>9.2}%", m.firm, m.pct_change);
    }
    println!();
    Ok(())
}

fn run_synth_cmd(
    dir: PathBuf,
    start: &str,
    end: &str,
    firms_per_sector: usize,
    defects: bool,
) -> Result<()> {
    let config = SyntheticConfig {
        start: parse_date(start)?,
        end: parse_date(end)?,
        firms_per_sector,
        inject_defects: defects,
    };
    let files = write_raw_files(&dir, &config)?;
    println!("Wrote {} raw file(s) to {}", files.len(), dir.display());
    if defects {
        println!("Files include split sector labels and blank closes.");
    }
    Ok(())
}

fn run_status(output_dir: &Path) -> Result<()> {
    let layout = OutputLayout::new(output_dir);
    let manifest_path = layout.manifest();
    if !manifest_path.exists() {
        println!("No run manifest in {}", output_dir.display());
        return Ok(());
    }
    let manifest = RunManifest::load(&manifest_path)?;
    print_manifest(&manifest);

    let mut total_size = 0u64;
    let mut missing = Vec::new();
    for name in TABLE_FILES {
        match std::fs::metadata(layout.file(name)) {
            Ok(meta) => total_size += meta.len(),
            Err(_) => missing.push(name),
        }
    }
    println!("Tables on disk: {}", format_size(total_size));
    for name in missing {
        println!("WARNING: missing {name}");
    }
    println!();
    Ok(())
}

fn print_clean_report(report: &CleanReport) {
    println!("Input rows:     {}", report.input_rows);
    println!("Output rows:    {}", report.output_rows);
    println!("Repaired:       {}", report.repaired_labels);
    println!("Duplicates:     {}", report.duplicates_collapsed);
    println!(
        "Dropped:        {} (date {}, price {}, label {}, close<=0 {}, year {})",
        report.dropped_total(),
        report.dropped_bad_date,
        report.dropped_missing_price,
        report.dropped_missing_label,
        report.dropped_non_positive_close,
        report.dropped_excluded_year
    );
}

fn print_manifest(manifest: &RunManifest) {
    println!();
    println!("=== SectorLens Run ===");
    println!("Finished:       {}", manifest.finished_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Duration:       {:.1}s", manifest.duration_secs());
    println!("Input files:    {}", manifest.source_files.len());
    println!("Dataset hash:   {}", &manifest.dataset_hash[..16.min(manifest.dataset_hash.len())]);
    match (manifest.window_start, manifest.window_end) {
        (Some(start), Some(end)) => println!("Window:         {start} to {end}"),
        _ => println!("Window:         (no data)"),
    }
    println!();
    println!("--- Cleaning ---");
    print_clean_report(&manifest.clean_report);
    println!();
    println!("--- Tables ---");
    for (name, rows) in &manifest.tables {
        println!("  {name:<48} {rows:>8}");
    }
    println!();
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
