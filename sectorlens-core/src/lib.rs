//! SectorLens Core - domain types, raw table loading, cleaning, metrics, ranking.
//!
//! This crate holds every computation of the pipeline and no output I/O:
//! - Domain rows and derived tables (prices, returns, drawdowns, movers)
//! - Raw table loading from CSV/Parquet with required-column validation
//! - Cleaning with a declarative repair table for malformed labels
//! - Metrics engine: daily/monthly returns, rolling volatility, drawdown,
//!   group aggregates and pairwise-complete correlation matrices
//! - Ranking & trend extraction over an inclusive date window

pub mod data;
pub mod domain;
pub mod metrics;
pub mod ranking;
