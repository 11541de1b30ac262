use anyhow::Context;
use clap::{Parser, Subcommand};
use marketdash::api::YahooFinanceClient;
use marketdash::config::AppConfig;
use marketdash::dashboard::Dashboard;
use marketdash::feed::MarketSnapshot;
use marketdash::models::Side;
use marketdash::orders;
use marketdash::watchlist::Watchlist;

#[derive(Parser)]
#[command(name = "marketdash", version, about = "Live market data dashboard core")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Follow a watchlist symbol: quotes, EMAs and a suggestion per poll
    Watch {
        /// Watchlist symbol to follow (defaults to the configured one)
        #[arg(short, long)]
        symbol: Option<String>,

        /// Seconds between polls
        #[arg(short, long)]
        interval_secs: Option<u64>,
    },
    /// Simulate an order at the current market price
    Order {
        /// Watchlist symbol to trade
        symbol: String,

        /// buy or sell
        side: Side,

        /// Number of lots
        quantity: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Order {
            symbol,
            side,
            quantity,
        }) => run_order(&symbol, side, quantity).await,
        Some(Command::Watch {
            symbol,
            interval_secs,
        }) => run_watch(symbol, interval_secs).await,
        None => run_watch(None, None).await,
    }
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("marketdash=info,marketdash::feed=debug")
        .init();
}

async fn run_watch(symbol: Option<String>, interval_secs: Option<u64>) -> anyhow::Result<()> {
    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(symbol) = symbol {
        config.default_symbol = symbol;
    }
    if let Some(secs) = interval_secs {
        config.poll_interval_secs = secs;
    }

    tracing::info!("🚀 Market dashboard starting");

    let watchlist = Watchlist::default();
    let client = YahooFinanceClient::new()?;
    let dashboard = Dashboard::start(client, watchlist, config)?;
    let mut snapshots = dashboard.snapshots();

    tracing::info!("📊 Watchlist:");
    for spec in dashboard.watchlist().entries() {
        tracing::info!(
            "    - {} ({}, lot size {})",
            spec.symbol,
            spec.display_name,
            spec.lot_size
        );
    }
    tracing::info!("Press Ctrl+C to stop...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("⚠️  Received Ctrl+C, shutting down...");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    tracing::error!("Quote feed closed unexpectedly");
                    break;
                }
                let snapshot = snapshots.borrow().clone();
                log_refresh(&snapshot);
            }
        }
    }

    dashboard.shutdown().await;
    tracing::info!("👋 Dashboard stopped");
    Ok(())
}

fn log_refresh(snapshot: &MarketSnapshot) {
    if let Some(error) = &snapshot.error {
        tracing::warn!("✗ {}: {}", snapshot.spec.symbol, error);
    }

    if snapshot.series.is_empty() {
        return;
    }

    tracing::info!(
        "💹 {} ({} bars)",
        snapshot.spec.chart_title,
        snapshot.series.len()
    );
    for (period, values) in &snapshot.emas {
        if let Some(last) = values.last() {
            tracing::info!("    EMA {:>2}: {:.2}", period, last);
        }
    }
    match snapshot.suggestion_text() {
        Some(text) => tracing::info!("    {}", text),
        None => tracing::info!("    Suggestion unavailable"),
    }
    if let Some(price) = snapshot.last_price {
        tracing::info!("    {}: {:.2}", snapshot.spec.price_label, price);
    }
}

async fn run_order(symbol: &str, side: Side, quantity: u32) -> anyhow::Result<()> {
    let watchlist = Watchlist::default();
    let spec = watchlist
        .get(symbol)
        .with_context(|| format!("unknown symbol: {symbol}"))?;

    let client = YahooFinanceClient::new()?;
    tracing::info!(
        symbol = %spec.symbol,
        lot_size = spec.lot_size,
        "Placing simulated {side} order for {quantity} lots"
    );

    let confirmation = orders::submit(&client, spec, side, quantity).await?;
    println!("{}", confirmation.message);
    Ok(())
}
