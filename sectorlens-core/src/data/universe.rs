//! Universe: the super sector -> sector -> firm hierarchy of a cleaned table.
//!
//! Built from the data rather than from a hand-maintained list, so the
//! dashboard filters always offer exactly what the tables contain.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::PriceRow;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    pub super_sectors: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl Universe {
    pub fn from_rows(rows: &[PriceRow]) -> Self {
        let mut u = Self::default();
        for row in rows {
            u.insert(&row.super_sector, &row.sector, &row.firm);
        }
        u
    }

    pub fn insert(&mut self, super_sector: &str, sector: &str, firm: &str) {
        self.super_sectors
            .entry(super_sector.to_string())
            .or_default()
            .entry(sector.to_string())
            .or_default()
            .insert(firm.to_string());
    }

    pub fn super_sector_names(&self) -> Vec<&str> {
        self.super_sectors.keys().map(|s| s.as_str()).collect()
    }

    /// Sector names, optionally restricted to one super sector. Sorted.
    pub fn sector_names(&self, super_sector: Option<&str>) -> Vec<&str> {
        let mut names: BTreeSet<&str> = BTreeSet::new();
        for (ss, sectors) in &self.super_sectors {
            if super_sector.is_some_and(|want| want != ss) {
                continue;
            }
            names.extend(sectors.keys().map(|s| s.as_str()));
        }
        names.into_iter().collect()
    }

    /// Firms belonging to any of `sectors`. Sorted, deduplicated.
    pub fn firms_in_sectors(&self, sectors: &[&str]) -> Vec<&str> {
        let mut firms: BTreeSet<&str> = BTreeSet::new();
        for by_sector in self.super_sectors.values() {
            for (sector, members) in by_sector {
                if sectors.contains(&sector.as_str()) {
                    firms.extend(members.iter().map(|f| f.as_str()));
                }
            }
        }
        firms.into_iter().collect()
    }

    pub fn all_firms(&self) -> Vec<&str> {
        let firms: BTreeSet<&str> = self
            .super_sectors
            .values()
            .flat_map(|s| s.values())
            .flat_map(|f| f.iter().map(|x| x.as_str()))
            .collect();
        firms.into_iter().collect()
    }

    pub fn super_sector_of_sector(&self, sector: &str) -> Option<&str> {
        self.super_sectors
            .iter()
            .find(|(_, sectors)| sectors.contains_key(sector))
            .map(|(ss, _)| ss.as_str())
    }

    pub fn firm_count(&self) -> usize {
        self.all_firms().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Universe {
        let mut u = Universe::default();
        u.insert("Materials", "Materials", "Ma'aden");
        u.insert("Materials", "Materials", "SABIC");
        u.insert("Consumer Staples", "Food & Beverages", "Almarai");
        u.insert("Consumer Staples", "Food & Beverages", "Savola");
        u.insert("Consumer Staples", "Household & Personal Products", "Nice One");
        u
    }

    #[test]
    fn sectors_filter_by_super_sector() {
        let u = sample();
        assert_eq!(
            u.sector_names(Some("Consumer Staples")),
            vec!["Food & Beverages", "Household & Personal Products"]
        );
        assert_eq!(u.sector_names(None).len(), 3);
    }

    #[test]
    fn firms_follow_sector_selection() {
        let u = sample();
        assert_eq!(
            u.firms_in_sectors(&["Food & Beverages", "Materials"]),
            vec!["Almarai", "Ma'aden", "SABIC", "Savola"]
        );
        assert_eq!(u.firm_count(), 5);
    }

    #[test]
    fn lookups() {
        let u = sample();
        assert_eq!(
            u.super_sector_of_sector("Food & Beverages"),
            Some("Consumer Staples")
        );
        assert_eq!(u.super_sector_of_sector("Unknown"), None);
    }
}
