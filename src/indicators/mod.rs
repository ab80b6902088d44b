// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the signal
// synthesizer reads.  Every function takes an ordered slice of values and
// returns an `IndicatorSeries` of the same length, with `None` marking the
// warm-up indices where there is not enough history for a value yet.
// Nothing is cached between calls.

pub mod ema;
pub mod macd;
pub mod overlay;
pub mod rsi;
pub mod sma;

/// Index-aligned indicator output; `None` means "no value yet".
pub type IndicatorSeries = Vec<Option<f64>>;

pub use ema::ema;
pub use macd::{macd, macd_default, MacdSeries};
pub use overlay::IndicatorOverlay;
pub use rsi::rsi;
pub use sma::sma;
