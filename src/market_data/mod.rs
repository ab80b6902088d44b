pub mod binance;
pub mod candle;
pub mod client;
pub mod rate_limit;
pub mod yahoo;

// Re-export the Candle struct for convenient access (e.g. `use crate::market_data::Candle`).
pub use candle::{Candle, CandleSeries};
pub use client::MarketDataClient;
pub use rate_limit::UsedWeightTracker;
