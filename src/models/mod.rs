use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// One intraday OHLCV bar as delivered by the quote source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Ordered bars for one symbol/interval pair, covering the current session.
///
/// A successful poll yields a fresh series; bars are never mutated in place.
/// Construction normalizes source data (sorted ascending, duplicate
/// timestamps dropped) so the ordering invariant holds for any source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub symbol: String,
    pub interval: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn empty(symbol: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            bars: Vec::new(),
        }
    }

    pub fn from_bars(
        symbol: impl Into<String>,
        interval: impl Into<String>,
        mut bars: Vec<Bar>,
    ) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            bars,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Open of the session's first bar
    pub fn session_open(&self) -> Option<f64> {
        self.bars.first().map(|b| b.open)
    }

    /// Close of the session's most recent bar
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Close column, in timestamp order (indicator input)
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

impl FromStr for Side {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(DashboardError::input(format!(
                "unknown order side '{}', expected Buy or Sell",
                other
            ))),
        }
    }
}

/// Sidebar grouping for watchlist entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketGroup {
    Indices,
    Stocks,
    GlobalMarkets,
}

impl fmt::Display for MarketGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketGroup::Indices => write!(f, "Indices"),
            MarketGroup::Stocks => write!(f, "Stocks"),
            MarketGroup::GlobalMarkets => write!(f, "Global Markets"),
        }
    }
}
