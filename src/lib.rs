// Core modules
pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod feed;
pub mod indicators;
pub mod models;
pub mod orders;
pub mod suggestion;
pub mod watchlist;

// Re-export commonly used types
pub use api::{QuoteSource, YahooFinanceClient};
pub use auth::{Authenticator, StaticAuthenticator};
pub use config::AppConfig;
pub use dashboard::Dashboard;
pub use error::{DashboardError, Result};
pub use feed::MarketSnapshot;
pub use models::{Bar, BarSeries, MarketGroup, Side};
pub use orders::{place_order, OrderConfirmation, OrderRequest};
pub use suggestion::{suggest, Suggestion};
pub use watchlist::{SymbolSpec, Watchlist};
