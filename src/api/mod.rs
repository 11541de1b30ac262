use std::future::Future;

use crate::error::Result;
use crate::models::BarSeries;

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

/// A provider of intraday bars and last traded prices.
///
/// The polling loop and the order path are generic over this seam so tests
/// can script quotes without a network. Errors surface as
/// [`DashboardError::Fetch`](crate::error::DashboardError::Fetch).
pub trait QuoteSource: Send + Sync {
    /// Fetch the current session's bars for `symbol` at `interval`
    fn fetch_bars(
        &self,
        symbol: &str,
        interval: &str,
    ) -> impl Future<Output = Result<BarSeries>> + Send;

    /// Fetch the latest traded price for `symbol`
    fn fetch_last_price(&self, symbol: &str) -> impl Future<Output = Result<f64>> + Send;
}
