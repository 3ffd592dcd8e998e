//! Raw table loading, schema validation and cleaning.

pub mod clean;
pub mod ingest;
pub mod repair;
pub mod schema;
pub mod universe;

pub use clean::{CleanOptions, CleanReport, CleanedTable, Cleaner};
pub use ingest::{DataError, DataIngestor, RawRecord, RawTable};
pub use repair::{RepairRule, RepairTable};
pub use schema::{RawColumn, RawSchema, SchemaError};
pub use universe::Universe;
