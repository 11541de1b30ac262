// Live feed: the polling loop and the snapshots it publishes

pub mod poller;
pub mod snapshot;

pub use poller::QuotePoller;
pub use snapshot::MarketSnapshot;
