//! Labelled square correlation matrix and the grouping keys it is built over.

use serde::{Deserialize, Serialize};

use super::PriceRow;

/// Categorical level used to aggregate firms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    Sector,
    SuperSector,
}

impl GroupKey {
    /// The label at this level from a row's sector and super sector.
    pub fn pick<'a>(self, sector: &'a str, super_sector: &'a str) -> &'a str {
        match self {
            GroupKey::Sector => sector,
            GroupKey::SuperSector => super_sector,
        }
    }

    pub fn of<'a>(&self, row: &'a PriceRow) -> &'a str {
        self.pick(&row.sector, &row.super_sector)
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupKey::Sector => "Sector",
            GroupKey::SuperSector => "Super Sector",
        }
    }
}

/// Symmetric matrix keyed by group label. Undefined entries are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `labels.len()` × `labels.len()`.
    pub values: Vec<Vec<f64>>,
}

impl Default for CorrelationMatrix {
    fn default() -> Self {
        Self::empty()
    }
}

impl CorrelationMatrix {
    pub fn new(labels: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        Self { labels, values }
    }

    pub fn empty() -> Self {
        Self {
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Entry for a pair of labels, `None` if either label is unknown.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[i][j])
    }

    /// True when every defined entry mirrors its transpose within `tol`
    /// and NaN entries are mirrored by NaN.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        let n = self.len();
        for i in 0..n {
            for j in 0..n {
                let (a, b) = (self.values[i][j], self.values[j][i]);
                if a.is_nan() != b.is_nan() {
                    return false;
                }
                if !a.is_nan() && (a - b).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Keep only the given labels, in matrix order.
    pub fn restrict(&self, keep: &[&str]) -> Self {
        let idx: Vec<usize> = (0..self.len())
            .filter(|&i| keep.contains(&self.labels[i].as_str()))
            .collect();
        Self {
            labels: idx.iter().map(|&i| self.labels[i].clone()).collect(),
            values: idx
                .iter()
                .map(|&i| idx.iter().map(|&j| self.values[i][j]).collect())
                .collect(),
        }
    }
}
