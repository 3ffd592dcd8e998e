//! Daily and monthly simple returns.

use chrono::Datelike;

use crate::domain::{MonthlyReturn, PriceRow};

/// Simple return between consecutive closes of one firm.
///
/// Output is aligned with the input: the first element is always `None`
/// (the first observation has no return), so `n` closes give `n - 1`
/// defined values.
pub fn daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    for (i, close) in closes.iter().enumerate() {
        if i == 0 {
            out.push(None);
        } else {
            out.push(Some(close / closes[i - 1] - 1.0));
        }
    }
    out
}

/// Month-over-month return of the last close in each calendar month.
///
/// `rows` must be one firm's rows sorted by date. The first month has no
/// predecessor and is omitted.
pub fn monthly_returns(rows: &[PriceRow]) -> Vec<MonthlyReturn> {
    let mut month_closes: Vec<((i32, u32), f64)> = Vec::new();
    for row in rows {
        let key = (row.date.year(), row.date.month());
        match month_closes.last_mut() {
            Some((last_key, close)) if *last_key == key => *close = row.close,
            _ => month_closes.push((key, row.close)),
        }
    }

    month_closes
        .windows(2)
        .map(|pair| {
            let ((year, month), close) = pair[1];
            MonthlyReturn {
                firm: rows[0].firm.clone(),
                month: format!("{year:04}-{month:02}"),
                monthly_return: close / pair[0].1 - 1.0,
            }
        })
        .collect()
}
