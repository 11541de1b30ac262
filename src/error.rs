//! Error types for the dashboard core.
//!
//! Two conditions matter at runtime: a quote fetch failing (non-fatal, the
//! poll loop keeps its last good data and continues) and invalid user input
//! on order placement (blocks the order, nothing else). Config errors only
//! occur at startup.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// Quote source call failed, timed out, or returned no usable data.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Invalid user input (bad quantity, unknown symbol, unparseable side).
    #[error("invalid input: {0}")]
    Input(String),

    /// Bad or missing configuration at startup.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// True for errors the poll loop absorbs rather than propagates.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Fetch(format!("request timed out: {}", err))
        } else {
            Self::Fetch(err.to_string())
        }
    }
}

impl From<config::ConfigError> for DashboardError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
