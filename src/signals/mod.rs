// =============================================================================
// Signals Module
// =============================================================================
//
// Turns a candle history into one trading call:
// - `signal`      the output value (direction, confidence, levels, rationale)
// - `synthesizer` the decision rule combining EMA trend, MACD momentum and RSI

pub mod signal;
pub mod synthesizer;

pub use signal::{Direction, RiskLevels, Signal};
pub use synthesizer::analyze;
