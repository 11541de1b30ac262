// Technical indicators: EMA series aligned with the session bars

pub mod moving_average;

pub use moving_average::{ema, ema_set};
