//! Domain types: cleaned price rows and the derived tables written per run.

pub mod correlation;
pub mod row;
pub mod tables;

pub use correlation::{CorrelationMatrix, GroupKey};
pub use row::PriceRow;
pub use tables::{
    DailyMetricRow, FirmDrawdown, FirmSummary, GroupPerformance, GroupPricePoint,
    GroupTotalReturn, MonthlyReturn, MoverSummary, SectorSummary,
};

/// Serde adapter: NaN (or any non-finite value) is written as an empty field
/// and an empty field reads back as NaN.
pub mod nan_as_empty {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
