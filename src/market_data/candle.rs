use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{Interval, Market};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar, normalized from whatever wire format the provider uses.
///
/// `time` is the bar's open time in milliseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// `true` when every price field and the volume are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    /// Full well-formedness check: finite fields, non-negative volume and
    /// `low <= open, close <= high`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "candle at {} has a non-finite field",
                self.time
            )));
        }
        if self.volume < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "candle at {} has negative volume {}",
                self.time, self.volume
            )));
        }
        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        if self.low > body_low || self.high < body_high {
            return Err(EngineError::InvalidInput(format!(
                "candle at {} violates low <= open,close <= high (o={} h={} l={} c={})",
                self.time, self.open, self.high, self.low, self.close
            )));
        }
        Ok(())
    }
}

/// Chronological candles for one symbol/interval as returned by a provider.
#[derive(Debug, Clone, Serialize)]
pub struct CandleSeries {
    /// The symbol as the provider knows it (after any mapping).
    pub symbol: String,
    pub market: Market,
    pub interval: Interval,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }
}

/// Sort by `time` and drop rows that repeat a timestamp (first one wins).
pub fn sort_and_dedup(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.time);
    candles.dedup_by_key(|c| c.time);
    candles
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
