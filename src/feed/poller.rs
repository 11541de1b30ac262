use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::api::QuoteSource;
use crate::config::AppConfig;
use crate::error::DashboardError;
use crate::feed::MarketSnapshot;
use crate::indicators::ema_set;
use crate::suggestion::suggest_for_series;
use crate::watchlist::SymbolSpec;

/// Drives the fetch/compute/publish cycle for the selected symbol.
///
/// Each cycle has two phases: idle until the ticker fires, then one bounded
/// quote call. A failed cycle keeps the previous series for the same symbol
/// and surfaces the error in the published snapshot; the next attempt is the
/// next scheduled tick, never an in-cycle retry. Missed ticks are skipped.
pub struct QuotePoller<S> {
    source: Arc<S>,
    config: AppConfig,
    selected: Arc<RwLock<SymbolSpec>>,
    snapshot_tx: watch::Sender<MarketSnapshot>,
    stop_rx: watch::Receiver<bool>,
}

impl<S: QuoteSource> QuotePoller<S> {
    pub fn new(
        source: Arc<S>,
        config: AppConfig,
        selected: Arc<RwLock<SymbolSpec>>,
        snapshot_tx: watch::Sender<MarketSnapshot>,
        stop_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            config,
            selected,
            snapshot_tx,
            stop_rx,
        }
    }

    pub async fn run(mut self) {
        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut polls: u64 = 0;

        loop {
            tokio::select! {
                _ = self.stop_rx.changed() => break,
                _ = ticker.tick() => {}
            }

            // A stop requested in the same instant as a tick wins
            if *self.stop_rx.borrow() {
                break;
            }

            polls += 1;
            let spec = self.selected.read().await.clone();
            let snapshot = self.poll_once(spec, polls).await;
            self.snapshot_tx.send_replace(snapshot);
        }

        tracing::info!(polls, "Quote feed stopped");
    }

    async fn poll_once(&self, spec: SymbolSpec, polls: u64) -> MarketSnapshot {
        let previous = self.snapshot_tx.borrow().clone();

        let bars_result = match timeout(
            self.config.fetch_timeout(),
            self.source.fetch_bars(&spec.symbol, &self.config.bar_interval),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(DashboardError::fetch(format!(
                "quote fetch for {} exceeded {}s",
                spec.symbol, self.config.fetch_timeout_secs
            ))),
        };

        match bars_result {
            Ok(series) => {
                let emas = ema_set(&series.closes(), &self.config.ema_periods);
                let suggestion = suggest_for_series(&series);
                if suggestion.is_none() {
                    tracing::warn!(symbol = %spec.symbol, "Suggestion inputs unavailable");
                }

                let (last_price, error) = match timeout(
                    self.config.fetch_timeout(),
                    self.source.fetch_last_price(&spec.symbol),
                )
                .await
                {
                    Ok(Ok(price)) => (Some(price), None),
                    Ok(Err(e)) => {
                        tracing::warn!(symbol = %spec.symbol, error = %e, "Live price fetch failed");
                        (None, Some(e.to_string()))
                    }
                    Err(_) => {
                        let e = DashboardError::fetch(format!(
                            "price fetch for {} exceeded {}s",
                            spec.symbol, self.config.fetch_timeout_secs
                        ));
                        tracing::warn!(symbol = %spec.symbol, error = %e, "Live price fetch timed out");
                        (None, Some(e.to_string()))
                    }
                };

                tracing::info!(
                    symbol = %spec.symbol,
                    bars = series.len(),
                    price = ?last_price,
                    "Poll complete"
                );

                MarketSnapshot {
                    spec,
                    series,
                    emas,
                    suggestion,
                    last_price,
                    error,
                    updated_at: Some(Utc::now()),
                    polls,
                }
            }
            Err(e) => {
                tracing::warn!(symbol = %spec.symbol, error = %e, "Quote fetch failed, keeping last data");

                // Retained data must belong to the same symbol; a switch
                // starts over with a clean series.
                if previous.spec.symbol == spec.symbol {
                    MarketSnapshot {
                        spec,
                        error: Some(e.to_string()),
                        polls,
                        ..previous
                    }
                } else {
                    let mut snapshot = MarketSnapshot::initial(spec, &self.config.bar_interval);
                    snapshot.error = Some(e.to_string());
                    snapshot.polls = polls;
                    snapshot
                }
            }
        }
    }
}
