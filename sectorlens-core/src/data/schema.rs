//! Required columns of a raw price table and header resolution.

use std::collections::HashMap;

/// A column the raw loader must find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawColumn {
    Date,
    Open,
    High,
    Low,
    Close,
    Sector,
    SuperSector,
    Firm,
}

impl RawColumn {
    pub const ALL: [RawColumn; 8] = [
        RawColumn::Date,
        RawColumn::Open,
        RawColumn::High,
        RawColumn::Low,
        RawColumn::Close,
        RawColumn::Sector,
        RawColumn::SuperSector,
        RawColumn::Firm,
    ];

    /// Canonical header name.
    pub fn name(self) -> &'static str {
        match self {
            RawColumn::Date => "Date",
            RawColumn::Open => "Open",
            RawColumn::High => "High",
            RawColumn::Low => "Low",
            RawColumn::Close => "Close",
            RawColumn::Sector => "Sector",
            RawColumn::SuperSector => "SuperSector",
            RawColumn::Firm => "Firm",
        }
    }

    /// Header names accepted for this column, canonical first. The super
    /// sector arrives from upstream as "Industry" or "Super Sector".
    pub fn accepted_names(self) -> &'static [&'static str] {
        match self {
            RawColumn::SuperSector => &["SuperSector", "Super Sector", "Industry"],
            RawColumn::Date => &["Date"],
            RawColumn::Open => &["Open"],
            RawColumn::High => &["High"],
            RawColumn::Low => &["Low"],
            RawColumn::Close => &["Close"],
            RawColumn::Sector => &["Sector"],
            RawColumn::Firm => &["Firm"],
        }
    }
}

/// Expected schema for raw price tables.
pub struct RawSchema;

impl RawSchema {
    /// Map every required column to the actual header present in `headers`.
    ///
    /// Headers are compared after trimming. A missing column is fatal: the
    /// stage must not produce a malformed table.
    pub fn resolve(headers: &[String]) -> Result<HashMap<RawColumn, String>, SchemaError> {
        let mut resolved = HashMap::new();
        for column in RawColumn::ALL {
            let found = column.accepted_names().iter().find_map(|accepted| {
                headers.iter().find(|h| h.trim() == *accepted).cloned()
            });
            match found {
                Some(header) => {
                    resolved.insert(column, header);
                }
                None => return Err(SchemaError::MissingColumn(column.name().to_string())),
            }
        }
        Ok(resolved)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}
