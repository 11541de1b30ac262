use std::collections::BTreeMap;

/// Calculate an Exponential Moving Average (EMA) series over closes.
///
/// Output is aligned one-to-one with the input: same length, same order.
/// The series is seeded at the first close and smoothed with
/// `alpha = 2 / (period + 1)`, no bias adjustment:
///
/// `ema[0] = closes[0]`, `ema[i] = alpha * closes[i] + (1 - alpha) * ema[i-1]`
///
/// Returns `None` when `period` is 0. The input is never modified.
pub fn ema(closes: &[f64], period: u32) -> Option<Vec<f64>> {
    if period == 0 {
        return None;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut series = Vec::with_capacity(closes.len());

    for &close in closes {
        let value = match series.last() {
            Some(&prev) => alpha * close + (1.0 - alpha) * prev,
            None => close,
        };
        series.push(value);
    }

    Some(series)
}

/// Calculate EMA series for several periods over the same closes.
///
/// Each period is computed independently; the result is keyed by period.
/// Invalid periods are skipped with a warning rather than failing the set.
pub fn ema_set(closes: &[f64], periods: &[u32]) -> BTreeMap<u32, Vec<f64>> {
    let mut set = BTreeMap::new();

    for &period in periods {
        match ema(closes, period) {
            Some(series) => {
                set.insert(period, series);
            }
            None => tracing::warn!(period, "Skipping EMA with invalid period"),
        }
    }

    set
}
