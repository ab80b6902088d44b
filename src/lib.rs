// =============================================================================
// markets-signal — technical-analysis signal engine
// =============================================================================
//
// Library surface:
//   indicators   SMA / EMA / RSI / MACD over close prices
//   signals      the synthesizer that turns candles into a trading call
//   market_data  candle model and Binance / Yahoo provider adapter
//   api          axum router exposing the above over HTTP
// =============================================================================

pub mod api;
pub mod app_state;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod runtime_config;
pub mod signals;
pub mod types;

pub use error::EngineError;
pub use market_data::Candle;
pub use signals::{analyze, Direction, Signal};
