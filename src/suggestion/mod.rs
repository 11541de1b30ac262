//! Naive buy/sell hint from the session open vs. the prior close.
//!
//! The rule is deliberately simplistic (a demo heuristic, not a strategy):
//! opened higher than the prior close means Buy, lower means Sell, equal
//! means sideways. The wording shown to the user is fixed per outcome.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::BarSeries;

/// Trading suggestion recomputed on every poll, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suggestion {
    Buy,
    Sell,
    /// Hold; the dashboard wording still leans Buy
    Sideways,
}

impl Suggestion {
    /// Literal dashboard wording for this suggestion
    pub fn message(&self, display_name: &str) -> String {
        match self {
            Suggestion::Sideways => "Market was sideways. Suggest to Buy.".to_string(),
            Suggestion::Buy => format!(
                "Market was down, and {} opened higher. Suggest to Buy.",
                display_name
            ),
            Suggestion::Sell => format!(
                "Market was up, and {} opened lower. Suggest to Sell.",
                display_name
            ),
        }
    }
}

/// Compare the prior close against the session open.
///
/// Total over real numbers. `None` when either input is NaN: a bad quote
/// must surface as unknown instead of silently landing in a branch.
pub fn suggest(previous_close: f64, session_open: f64) -> Option<Suggestion> {
    match previous_close.partial_cmp(&session_open)? {
        Ordering::Equal => Some(Suggestion::Sideways),
        Ordering::Less => Some(Suggestion::Buy),
        Ordering::Greater => Some(Suggestion::Sell),
    }
}

/// Derive both comparison inputs from the session series.
///
/// The first intraday bar carries them: its open is the session open and
/// its close stands in for the prior settlement. `None` on an empty series.
pub fn suggest_for_series(series: &BarSeries) -> Option<Suggestion> {
    let first = series.first()?;
    suggest(first.close, first.open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bar;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_equal_values_hold() {
        for x in [0.0, 1.0, 18000.0, -42.5] {
            assert_eq!(suggest(x, x), Some(Suggestion::Sideways));
        }
    }

    #[test]
    fn test_opened_higher_is_buy() {
        assert_eq!(suggest(18000.0, 18050.0), Some(Suggestion::Buy));
        assert_eq!(suggest(99.99, 100.0), Some(Suggestion::Buy));
    }

    #[test]
    fn test_opened_lower_is_sell() {
        assert_eq!(suggest(18050.0, 18000.0), Some(Suggestion::Sell));
        assert_eq!(suggest(100.0, 99.99), Some(Suggestion::Sell));
    }

    #[test]
    fn test_nan_is_unknown() {
        assert_eq!(suggest(f64::NAN, 18000.0), None);
        assert_eq!(suggest(18000.0, f64::NAN), None);
        assert_eq!(suggest(f64::NAN, f64::NAN), None);
    }

    #[test]
    fn test_message_wording() {
        assert_eq!(
            Suggestion::Sideways.message("Nifty 50"),
            "Market was sideways. Suggest to Buy."
        );
        assert_eq!(
            Suggestion::Buy.message("Nifty 50"),
            "Market was down, and Nifty 50 opened higher. Suggest to Buy."
        );
        assert_eq!(
            Suggestion::Sell.message("Dow Jones Futures"),
            "Market was up, and Dow Jones Futures opened lower. Suggest to Sell."
        );
    }

    #[test]
    fn test_suggest_for_series_uses_first_bar() {
        let series = BarSeries::from_bars(
            "^NSEI",
            "1m",
            vec![
                Bar {
                    timestamp: Utc.timestamp_opt(60, 0).unwrap(),
                    open: 18050.0,
                    high: 18060.0,
                    low: 17990.0,
                    close: 18000.0,
                    volume: 0.0,
                },
                Bar {
                    timestamp: Utc.timestamp_opt(120, 0).unwrap(),
                    open: 18000.0,
                    high: 18010.0,
                    low: 17995.0,
                    close: 18005.0,
                    volume: 0.0,
                },
            ],
        );

        // first bar: close 18000 vs open 18050 -> opened higher
        assert_eq!(suggest_for_series(&series), Some(Suggestion::Buy));
    }

    #[test]
    fn test_suggest_for_empty_series_is_unknown() {
        let series = BarSeries::empty("^NSEI", "1m");
        assert_eq!(suggest_for_series(&series), None);
    }
}
