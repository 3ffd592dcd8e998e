//! SectorLens TUI - terminal dashboard over a finished run's output tables.
//!
//! The dashboard only reads the files written by the pipeline:
//! - Summary: per-firm price change, sector stats or movers, price trends
//! - Performance: close price comparison of chosen firms
//! - Risk: daily returns and drawdown per chosen firm
//! - Correlation: sector and super sector heat tables
//! - Data: any output table, as stored
//!
//! Filter projections and exports are pure functions over the loaded tables.

pub mod app;
pub mod dataset;
pub mod export;
pub mod filters;
pub mod input;
pub mod persistence;
pub mod theme;
pub mod ui;

pub use app::AppState;
pub use dataset::Dataset;
pub use filters::FilterState;
