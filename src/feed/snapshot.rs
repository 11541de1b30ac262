use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::BarSeries;
use crate::suggestion::Suggestion;
use crate::watchlist::SymbolSpec;

/// Everything the presentation layer needs for one refresh cycle.
///
/// Published over a watch channel: subscribers always see the latest value,
/// never a backlog.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    /// Symbol metadata for titles and labels
    pub spec: SymbolSpec,
    /// Session bars; kept from the last good poll when a fetch fails
    pub series: BarSeries,
    /// EMA series keyed by period, aligned with `series`
    pub emas: BTreeMap<u32, Vec<f64>>,
    /// `None` until bars arrive, or when the inputs are not comparable
    pub suggestion: Option<Suggestion>,
    /// Latest traded price, absent while the price fetch is failing
    pub last_price: Option<f64>,
    /// Message from the most recent failed fetch, cleared on a clean cycle
    pub error: Option<String>,
    /// Completion time of the last successful poll
    pub updated_at: Option<DateTime<Utc>>,
    /// Poll cycles attempted since the feed started, success or failure
    pub polls: u64,
}

impl MarketSnapshot {
    /// Snapshot shown before the first poll completes
    pub fn initial(spec: SymbolSpec, interval: &str) -> Self {
        let series = BarSeries::empty(spec.symbol.clone(), interval);
        Self {
            spec,
            series,
            emas: BTreeMap::new(),
            suggestion: None,
            last_price: None,
            error: None,
            updated_at: None,
            polls: 0,
        }
    }

    /// Suggestion wording with the symbol's display name filled in
    pub fn suggestion_text(&self) -> Option<String> {
        self.suggestion.map(|s| s.message(&self.spec.display_name))
    }
}
