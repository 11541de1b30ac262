use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::TimeZone;
use chrono::Utc;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use tokio::time::{sleep, Duration};

use crate::api::QuoteSource;
use crate::error::{DashboardError, Result};
use crate::models::{Bar, BarSeries};

const YAHOO_API_BASE: &str = "https://query1.finance.yahoo.com";
const MAX_RETRIES: u32 = 3;
const RATE_LIMIT_RPM: u32 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 30;
// The chart endpoint rejects the default reqwest user agent
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

type YahooRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Client for the Yahoo Finance v8 chart API
#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    rate_limiter: Arc<YahooRateLimiter>,
}

// ============== Raw chart payload ==============

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[allow(dead_code)]
    symbol: String,
    #[serde(default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

// ============== Client ==============

impl YahooFinanceClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(YAHOO_API_BASE)
    }

    /// Base URL override, used by tests to point at a stub server
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        let quota = Quota::per_minute(NonZeroU32::new(RATE_LIMIT_RPM).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client,
            base_url: base_url.into(),
            rate_limiter,
        })
    }

    async fn fetch_chart(&self, symbol: &str, interval: &str, range: &str) -> Result<ChartData> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval={}&range={}&includePrePost=true",
            self.base_url, symbol, interval, range
        );

        let response = self.make_request(&url).await?;
        let envelope: ChartEnvelope = response.json().await?;

        if let Some(err) = envelope.chart.error {
            return Err(DashboardError::fetch(format!(
                "{}: {}",
                err.code, err.description
            )));
        }

        envelope
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| DashboardError::fetch(format!("no chart data returned for {}", symbol)))
    }

    /// Make a rate-limited request with retry on transient failures.
    /// 429 and 5xx back off exponentially; other 4xx fail immediately.
    async fn make_request(&self, url: &str) -> Result<reqwest::Response> {
        for attempt in 1..=MAX_RETRIES {
            self.rate_limiter.until_ready().await;

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        if attempt < MAX_RETRIES {
                            let backoff_secs = 2u64.pow(attempt);
                            tracing::warn!(
                                "Quote API returned {}, retrying in {}s (attempt {}/{})",
                                status,
                                backoff_secs,
                                attempt,
                                MAX_RETRIES
                            );
                            sleep(Duration::from_secs(backoff_secs)).await;
                            continue;
                        }
                        return Err(DashboardError::fetch(format!(
                            "quote API returned {} after {} attempts",
                            status, MAX_RETRIES
                        )));
                    }

                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "unknown error".to_string());
                    return Err(DashboardError::fetch(format!(
                        "quote API error ({}): {}",
                        status, body
                    )));
                }
                Err(e) if attempt < MAX_RETRIES => {
                    let backoff_secs = 2u64.pow(attempt);
                    tracing::warn!(
                        "Network error: {}, retrying in {}s (attempt {}/{})",
                        e,
                        backoff_secs,
                        attempt,
                        MAX_RETRIES
                    );
                    sleep(Duration::from_secs(backoff_secs)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DashboardError::fetch(format!(
            "failed after {} retries",
            MAX_RETRIES
        )))
    }
}

impl QuoteSource for YahooFinanceClient {
    async fn fetch_bars(&self, symbol: &str, interval: &str) -> Result<BarSeries> {
        let chart = self.fetch_chart(symbol, interval, "1d").await?;
        let bars = parse_bars(&chart);

        if bars.is_empty() {
            return Err(DashboardError::fetch(format!(
                "no bars returned for {}",
                symbol
            )));
        }

        tracing::debug!(symbol, bars = bars.len(), "Fetched session bars");
        Ok(BarSeries::from_bars(symbol, interval, bars))
    }

    async fn fetch_last_price(&self, symbol: &str) -> Result<f64> {
        let chart = self.fetch_chart(symbol, "1d", "1d").await?;

        if let Some(price) = chart.meta.regular_market_price {
            return Ok(price);
        }

        // Some payloads omit the meta price; fall back to the last close
        parse_bars(&chart)
            .last()
            .map(|bar| bar.close)
            .ok_or_else(|| DashboardError::fetch(format!("no live price available for {}", symbol)))
    }
}

/// Zip timestamps with the quote columns. Minutes with no trades come back
/// as nulls and are dropped.
fn parse_bars(chart: &ChartData) -> Vec<Bar> {
    let Some(quote) = chart.indicators.quote.first() else {
        return Vec::new();
    };

    let mut bars = Vec::with_capacity(chart.timestamp.len());

    for (i, &ts) in chart.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
        ) else {
            continue;
        };

        let Some(timestamp) = Utc.timestamp_opt(ts, 0).single() else {
            continue;
        };

        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: value_at(&quote.volume, i).unwrap_or(0.0),
        });
    }

    bars
}

fn value_at(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn chart_body(symbol: &str) -> serde_json::Value {
        serde_json::json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": symbol, "regularMarketPrice": 3510.5 },
                    "timestamp": [1700000000i64, 1700000060i64, 1700000120i64],
                    "indicators": { "quote": [{
                        "open":   [3500.0, null, 3505.0],
                        "high":   [3502.0, null, 3507.0],
                        "low":    [3498.0, null, 3503.0],
                        "close":  [3501.0, null, 3506.0],
                        "volume": [1200.0, null, 900.0]
                    }]}
                }],
                "error": null
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_bars_parses_chart_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v8/finance/chart/TCS.BO")
            .match_query(Matcher::UrlEncoded("interval".into(), "1m".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chart_body("TCS.BO").to_string())
            .create_async()
            .await;

        let client = YahooFinanceClient::with_base_url(server.url()).unwrap();
        let series = client.fetch_bars("TCS.BO", "1m").await.unwrap();

        mock.assert_async().await;
        // the null row is dropped
        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol, "TCS.BO");
        assert_eq!(series.interval, "1m");
        assert_eq!(series.first().unwrap().open, 3500.0);
        assert_eq!(series.first().unwrap().volume, 1200.0);
        assert_eq!(series.last().unwrap().close, 3506.0);
    }

    #[tokio::test]
    async fn test_fetch_last_price_uses_meta() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v8/finance/chart/TCS.BO")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(chart_body("TCS.BO").to_string())
            .create_async()
            .await;

        let client = YahooFinanceClient::with_base_url(server.url()).unwrap();
        let price = client.fetch_last_price("TCS.BO").await.unwrap();
        assert_eq!(price, 3510.5);
    }

    #[tokio::test]
    async fn test_fetch_last_price_falls_back_to_last_close() {
        let body = serde_json::json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "TCS.BO" },
                    "timestamp": [1700000000i64, 1700000060i64],
                    "indicators": { "quote": [{
                        "open":   [3500.0, 3501.0],
                        "high":   [3502.0, 3503.0],
                        "low":    [3498.0, 3499.0],
                        "close":  [3501.0, 3502.25],
                        "volume": [1200.0, 800.0]
                    }]}
                }],
                "error": null
            }
        });

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v8/finance/chart/TCS.BO")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = YahooFinanceClient::with_base_url(server.url()).unwrap();
        let price = client.fetch_last_price("TCS.BO").await.unwrap();
        assert_eq!(price, 3502.25);
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_fetch_error() {
        let body = serde_json::json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        });

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v8/finance/chart/BOGUS")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = YahooFinanceClient::with_base_url(server.url()).unwrap();
        let err = client.fetch_bars("BOGUS", "1m").await.unwrap_err();

        assert!(err.is_fetch());
        assert!(err.to_string().contains("delisted"));
    }

    #[tokio::test]
    async fn test_empty_result_is_a_fetch_error() {
        let body = serde_json::json!({ "chart": { "result": [], "error": null } });

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v8/finance/chart/TCS.BO")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = YahooFinanceClient::with_base_url(server.url()).unwrap();
        let err = client.fetch_bars("TCS.BO", "1m").await.unwrap_err();
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn test_client_errors_fail_fast() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v8/finance/chart/TCS.BO")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("not found")
            .expect(1)
            .create_async()
            .await;

        let client = YahooFinanceClient::with_base_url(server.url()).unwrap();
        let err = client.fetch_bars("TCS.BO", "1m").await.unwrap_err();

        // a single attempt, no retries
        mock.assert_async().await;
        assert!(err.is_fetch());
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_server_errors_retry_then_fail() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v8/finance/chart/TCS.BO")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(MAX_RETRIES as usize)
            .create_async()
            .await;

        let client = YahooFinanceClient::with_base_url(server.url()).unwrap();
        let err = client.fetch_bars("TCS.BO", "1m").await.unwrap_err();

        mock.assert_async().await;
        assert!(err.is_fetch());
    }

    #[tokio::test]
    #[ignore] // Hits the real Yahoo endpoint
    async fn test_fetch_bars_live() {
        let client = YahooFinanceClient::new().unwrap();
        let series = client.fetch_bars("^NSEI", "1m").await.unwrap();

        assert!(!series.is_empty());
        assert!(series.last_close().unwrap() > 0.0);
    }
}
