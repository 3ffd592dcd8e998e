//! Price trend extraction over the ranking window.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{GroupKey, GroupPricePoint, PriceRow};

/// Window rows at daily granularity, in input order.
pub fn trend_rows(rows: &[PriceRow], start: NaiveDate, end: NaiveDate) -> Vec<PriceRow> {
    rows.iter()
        .filter(|r| r.date >= start && r.date <= end)
        .cloned()
        .collect()
}

/// Mean close per (date, group), ordered by date then group.
pub fn group_price_trend(rows: &[PriceRow], key: GroupKey) -> Vec<GroupPricePoint> {
    let mut acc: BTreeMap<(NaiveDate, &str), (f64, usize)> = BTreeMap::new();
    for row in rows {
        let slot = acc.entry((row.date, key.of(row))).or_insert((0.0, 0));
        slot.0 += row.close;
        slot.1 += 1;
    }

    acc.into_iter()
        .map(|((date, group), (sum, n))| GroupPricePoint {
            date,
            group: group.to_string(),
            mean_close: sum / n as f64,
        })
        .collect()
}
