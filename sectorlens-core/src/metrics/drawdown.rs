//! Drawdown from the running maximum close.

/// Drawdown at each observation: `(close - running_max) / running_max`.
/// Always `<= 0`.
pub fn drawdown_series(closes: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    closes
        .iter()
        .map(|&c| {
            peak = peak.max(c);
            (c - peak) / peak
        })
        .collect()
}

/// Worst (most negative) drawdown. NaN below 2 observations.
pub fn max_drawdown(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return f64::NAN;
    }
    drawdown_series(closes)
        .into_iter()
        .fold(0.0, f64::min)
}
