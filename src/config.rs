//! Runtime configuration.
//!
//! Layered: built-in defaults, then an optional `marketdash.toml`, then
//! `MARKETDASH_*` environment overrides. Poll cadence, EMA periods and
//! the login table all flow in from here; nothing reads the environment
//! ad hoc at runtime.

use serde::Deserialize;
use std::collections::HashMap;
use tokio::time::Duration;

use crate::auth::StaticAuthenticator;
use crate::error::{DashboardError, Result};
use crate::watchlist::Watchlist;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Seconds between polls
    pub poll_interval_secs: u64,
    /// Bound on a single quote source call
    pub fetch_timeout_secs: u64,
    /// Bar interval requested from the quote source
    pub bar_interval: String,
    /// EMA periods rendered on the chart
    pub ema_periods: Vec<u32>,
    /// Symbol selected at startup
    pub default_symbol: String,
    /// Dashboard login table (username -> password)
    #[serde(default)]
    pub users: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            fetch_timeout_secs: 20,
            bar_interval: "1m".to_string(),
            ema_periods: vec![10, 20, 50],
            default_symbol: "^NSEI".to_string(),
            users: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, file, and environment
    pub fn load() -> Result<Self> {
        let defaults = AppConfig::default();

        let settings = config::Config::builder()
            .set_default("poll_interval_secs", defaults.poll_interval_secs)?
            .set_default("fetch_timeout_secs", defaults.fetch_timeout_secs)?
            .set_default("bar_interval", defaults.bar_interval)?
            .set_default(
                "ema_periods",
                defaults
                    .ema_periods
                    .iter()
                    .map(|p| *p as i64)
                    .collect::<Vec<i64>>(),
            )?
            .set_default("default_symbol", defaults.default_symbol)?
            .add_source(config::File::with_name("marketdash").required(false))
            .add_source(
                config::Environment::with_prefix("MARKETDASH")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("ema_periods"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Reject configurations the feed cannot run with
    pub fn validate(&self, watchlist: &Watchlist) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(DashboardError::Config(
                "poll_interval_secs must be >= 1".to_string(),
            ));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(DashboardError::Config(
                "fetch_timeout_secs must be >= 1".to_string(),
            ));
        }

        if self.bar_interval.is_empty() {
            return Err(DashboardError::Config(
                "bar_interval must not be empty".to_string(),
            ));
        }

        if self.ema_periods.is_empty() {
            return Err(DashboardError::Config(
                "ema_periods must list at least one period".to_string(),
            ));
        }

        if self.ema_periods.iter().any(|p| *p == 0) {
            return Err(DashboardError::Config(
                "ema_periods must all be > 0".to_string(),
            ));
        }

        if !watchlist.contains(&self.default_symbol) {
            return Err(DashboardError::Config(format!(
                "default_symbol '{}' is not in the watchlist",
                self.default_symbol
            )));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Authenticator backed by the configured login table
    pub fn authenticator(&self) -> StaticAuthenticator {
        StaticAuthenticator::new(self.users.clone())
    }
}
