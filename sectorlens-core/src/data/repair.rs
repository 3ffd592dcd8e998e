//! Declarative repair of sector labels split by a stray delimiter.
//!
//! The scraper occasionally lets a comma inside a sector name spill into the
//! firm field. Each rule names the broken prefix of `"{Sector},{Firm}"` and
//! the sector it should have been.

use serde::{Deserialize, Serialize};

/// One (bad prefix -> corrected sector) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRule {
    pub bad_prefix: String,
    pub sector: String,
}

impl RepairRule {
    pub fn new(bad_prefix: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            bad_prefix: bad_prefix.into(),
            sector: sector.into(),
        }
    }

    /// Text after the prefix's first delimiter, i.e. the part that leaked
    /// into the firm field.
    fn leaked_fragment(&self) -> Option<&str> {
        self.bad_prefix
            .split_once(',')
            .map(|(_, tail)| tail.trim())
            .filter(|tail| !tail.is_empty())
    }
}

/// Ordered rule table. First match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairTable {
    rules: Vec<RepairRule>,
}

const EXCHANGE_SECTORS: [(&str, &str); 14] = [
    ("Food,& Beverages", "Food & Beverages"),
    ("Capital,Goods", "Capital Goods"),
    ("Commercial,& Professional", "Commercial & Professional"),
    ("Consumer,Durables & Apparel", "Consumer Durables & Apparel"),
    ("Consumer,Services", "Consumer Services"),
    ("Media,and Entertainment", "Media and Entertainment"),
    (
        "Consumer,Discretionary Distribution & Retail",
        "Consumer Discretionary Distribution & Retail",
    ),
    (
        "Consumer,Staples Distribution & Retail",
        "Consumer Staples Distribution & Retail",
    ),
    ("Household,& Personal Products", "Household & Personal Products"),
    ("Health,Care Equipment & Svc", "Health Care Equipment & Svc"),
    ("Pharma,Biotech & Life Science", "Pharma Biotech & Life Science"),
    ("Financial,Services", "Financial Services"),
    ("Software,& Services", "Software & Services"),
    ("Telecommunication,Services", "Telecommunication Services"),
];

impl RepairTable {
    pub fn new(rules: Vec<RepairRule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The fourteen known broken sector names of the exchange.
    pub fn default_exchange() -> Self {
        Self::new(
            EXCHANGE_SECTORS
                .iter()
                .map(|(bad, fixed)| RepairRule::new(*bad, *fixed))
                .collect(),
        )
    }

    pub fn rules(&self) -> &[RepairRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Repair a (sector, firm) pair. Returns `None` when no rule matches,
    /// in which case the pair passes through unchanged.
    pub fn apply(&self, sector: &str, firm: &str) -> Option<(String, String)> {
        let combined = format!("{sector},{firm}");

        for rule in &self.rules {
            let Some(rest) = combined.strip_prefix(rule.bad_prefix.as_str()) else {
                continue;
            };
            // The prefix must end on a field boundary.
            if !rest.is_empty() && !rest.starts_with(',') {
                continue;
            }

            let mut firm = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
            if let Some(leaked) = rule.leaked_fragment() {
                if let Some(after) = firm
                    .strip_prefix(leaked)
                    .and_then(|after| after.trim_start().strip_prefix(','))
                {
                    firm = after;
                }
            }

            return Some((rule.sector.clone(), firm.trim().to_string()));
        }
        None
    }
}

impl Default for RepairTable {
    fn default() -> Self {
        Self::default_exchange()
    }
}
