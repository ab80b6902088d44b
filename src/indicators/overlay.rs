// =============================================================================
// Chart Overlay — the indicator bundle drawn over the price series
// =============================================================================

use serde::Serialize;

use super::ema::ema;
use super::macd::{macd_default, MacdSeries};
use super::rsi::{rsi, DEFAULT_RSI_PERIOD};
use super::IndicatorSeries;

/// EMA20 / EMA50 / RSI14 / MACD(12, 26, 9), all index-aligned with the closes
/// they were computed from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorOverlay {
    pub ema20: IndicatorSeries,
    pub ema50: IndicatorSeries,
    pub rsi14: IndicatorSeries,
    pub macd: MacdSeries,
}

impl IndicatorOverlay {
    pub fn from_closes(closes: &[f64]) -> Self {
        Self {
            ema20: ema(closes, 20),
            ema50: ema(closes, 50),
            rsi14: rsi(closes, DEFAULT_RSI_PERIOD),
            macd: macd_default(closes),
        }
    }

    pub fn len(&self) -> usize {
        self.ema20.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema20.is_empty()
    }
}
