//! Static symbol table: identifier, presentation strings, lot size, group.
//!
//! One entry per symbol drives the whole dashboard; there is no per-symbol
//! code path anywhere else.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::MarketGroup;

/// Presentation and sizing metadata for one selectable symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub symbol: String,
    /// Short name used inside suggestion texts ("Nifty 50", "TCS", ...)
    pub display_name: String,
    pub chart_title: String,
    pub price_label: String,
    /// Contract lot size quantities are denominated in
    pub lot_size: u32,
    pub group: MarketGroup,
}

impl SymbolSpec {
    pub fn new(
        symbol: &str,
        display_name: &str,
        chart_title: &str,
        price_label: &str,
        lot_size: u32,
        group: MarketGroup,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            chart_title: chart_title.to_string(),
            price_label: price_label.to_string(),
            lot_size,
            group,
        }
    }
}

/// The symbol table the presentation layer renders selectable options from
/// and the order simulator sizes lots with.
///
/// Invariant: every symbol has exactly one entry. `new` keeps the first
/// entry per symbol and drops later duplicates.
#[derive(Debug, Clone)]
pub struct Watchlist {
    entries: Vec<SymbolSpec>,
}

impl Watchlist {
    pub fn new(entries: Vec<SymbolSpec>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(entries.len());
        for entry in entries {
            if seen.insert(entry.symbol.clone()) {
                unique.push(entry);
            } else {
                tracing::warn!(symbol = %entry.symbol, "Duplicate watchlist entry dropped");
            }
        }
        Self { entries: unique }
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolSpec> {
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn entries(&self) -> &[SymbolSpec] {
        &self.entries
    }

    pub fn in_group(&self, group: MarketGroup) -> impl Iterator<Item = &SymbolSpec> {
        self.entries.iter().filter(move |e| e.group == group)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.symbol.as_str())
    }
}

/// NSE index lots are 15; everything else trades in lots of 1500
const INDEX_LOT: u32 = 15;
const STOCK_LOT: u32 = 1500;

impl Default for Watchlist {
    fn default() -> Self {
        use MarketGroup::{GlobalMarkets, Indices, Stocks};

        Self::new(vec![
            SymbolSpec::new(
                "^NSEI",
                "Nifty 50",
                "Nifty 50 Live Stock Data",
                "Nifty 50 Live Price",
                INDEX_LOT,
                Indices,
            ),
            SymbolSpec::new(
                "^NSEBANK",
                "Bank Nifty",
                "Bank Nifty Live Stock Data",
                "Bank Nifty Live Price",
                INDEX_LOT,
                Indices,
            ),
            SymbolSpec::new(
                "RELIANCE.BO",
                "Reliance",
                "Reliance Industries Live Stock Data",
                "Reliance Live Price",
                STOCK_LOT,
                Stocks,
            ),
            SymbolSpec::new(
                "TCS.BO",
                "TCS",
                "Tata Consultancy Services Live Stock Data",
                "TCS Live Price",
                STOCK_LOT,
                Stocks,
            ),
            SymbolSpec::new(
                "INFY.BO",
                "Infosys",
                "Infosys Live Stock Data",
                "Infosys Live Price",
                STOCK_LOT,
                Stocks,
            ),
            SymbolSpec::new(
                "HDFCBANK.BO",
                "HDFC Bank",
                "HDFC Bank Live Stock Data",
                "HDFC Bank Live Price",
                STOCK_LOT,
                Stocks,
            ),
            SymbolSpec::new(
                "^DJI",
                "Dow Jones",
                "Dow Jones Industrial Average Live Data",
                "Dow Jones Live Price",
                STOCK_LOT,
                GlobalMarkets,
            ),
            SymbolSpec::new(
                "^IXIC",
                "Nasdaq",
                "Nasdaq Composite Live Data",
                "Nasdaq Live Price",
                STOCK_LOT,
                GlobalMarkets,
            ),
            SymbolSpec::new(
                "^GSPC",
                "S&P 500",
                "S&P 500 Live Data",
                "S&P 500 Live Price",
                STOCK_LOT,
                GlobalMarkets,
            ),
            SymbolSpec::new(
                "YM=F",
                "Dow Jones Futures",
                "Dow Jones Industrial Average Futures Live Data",
                "Dow Jones Futures Live Price",
                STOCK_LOT,
                GlobalMarkets,
            ),
        ])
    }
}
