// Engine facade: owns the background feed and answers UI-facing calls

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use crate::api::QuoteSource;
use crate::config::AppConfig;
use crate::error::{DashboardError, Result};
use crate::feed::{MarketSnapshot, QuotePoller};
use crate::models::Side;
use crate::orders::{self, OrderConfirmation};
use crate::watchlist::{SymbolSpec, Watchlist};

/// Single entry point for a front end: a running feed plus the
/// watchlist, symbol selection and order simulation around it.
pub struct Dashboard<S> {
    source: Arc<S>,
    watchlist: Watchlist,
    snapshot_rx: watch::Receiver<MarketSnapshot>,
    selected: Arc<RwLock<SymbolSpec>>,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl<S: QuoteSource + 'static> Dashboard<S> {
    /// Validates the configuration and spawns the quote poller.
    pub fn start(source: S, watchlist: Watchlist, config: AppConfig) -> Result<Self> {
        config.validate(&watchlist)?;

        let spec = watchlist
            .get(&config.default_symbol)
            .cloned()
            .ok_or_else(|| {
                DashboardError::Config(format!(
                    "default_symbol '{}' is not in the watchlist",
                    config.default_symbol
                ))
            })?;

        let source = Arc::new(source);
        let selected = Arc::new(RwLock::new(spec.clone()));
        let (snapshot_tx, snapshot_rx) =
            watch::channel(MarketSnapshot::initial(spec.clone(), &config.bar_interval));
        let (stop_tx, stop_rx) = watch::channel(false);

        let interval_secs = config.poll_interval_secs;
        let poller = QuotePoller::new(
            Arc::clone(&source),
            config,
            Arc::clone(&selected),
            snapshot_tx,
            stop_rx,
        );
        let task = tokio::spawn(poller.run());

        tracing::info!(
            symbol = %spec.symbol,
            interval_secs,
            "Dashboard started"
        );

        Ok(Self {
            source,
            watchlist,
            snapshot_rx,
            selected,
            stop_tx,
            task,
        })
    }

    /// Receiver that sees every published snapshot
    pub fn snapshots(&self) -> watch::Receiver<MarketSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Latest snapshot without waiting for the next poll
    pub fn latest(&self) -> MarketSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    /// Points the feed at another watchlist symbol. The switch takes
    /// effect on the next poll.
    pub async fn select_symbol(&self, symbol: &str) -> Result<()> {
        let spec = self
            .watchlist
            .get(symbol)
            .cloned()
            .ok_or_else(|| DashboardError::input(format!("unknown symbol: {symbol}")))?;

        tracing::info!(symbol = %spec.symbol, name = %spec.display_name, "Switching symbol");
        *self.selected.write().await = spec;
        Ok(())
    }

    /// Simulates an order for a watchlist symbol at a freshly fetched price.
    pub async fn place_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: u32,
    ) -> Result<OrderConfirmation> {
        let spec = self
            .watchlist
            .get(symbol)
            .ok_or_else(|| DashboardError::input(format!("unknown symbol: {symbol}")))?;

        orders::submit(self.source.as_ref(), spec, side, quantity).await
    }

    /// Stops the poller and waits for the task to finish.
    pub async fn shutdown(self) {
        // The receiver may already be gone if the loop exited on its own
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Feed task ended abnormally");
        }
    }
}
