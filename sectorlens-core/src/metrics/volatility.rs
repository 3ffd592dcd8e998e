//! Trailing rolling volatility of daily returns.

use super::stats::sample_std;

/// Sample standard deviation of the trailing `window` defined returns.
///
/// `returns` is aligned with a firm's rows (leading `None` for the first
/// row). A value is emitted on every row from the one carrying the
/// `window`-th return onward; earlier rows are `None`.
pub fn rolling_volatility(returns: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut seen: Vec<f64> = Vec::with_capacity(returns.len());
    let mut out = Vec::with_capacity(returns.len());

    for r in returns {
        match r {
            Some(v) => {
                seen.push(*v);
                if window > 0 && seen.len() >= window {
                    let sd = sample_std(&seen[seen.len() - window..]);
                    out.push(sd.is_finite().then_some(sd));
                } else {
                    out.push(None);
                }
            }
            None => out.push(None),
        }
    }
    out
}
