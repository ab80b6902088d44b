// =============================================================================
// Signal Synthesizer — candles in, one trading call out
// =============================================================================
//
// Pipeline:
//   1. Insufficient-history guard (< 60 candles => neutral, 0.3)
//   2. Boundary validation (finite fields, strictly increasing time)
//   3. Compute EMA20, EMA50, RSI14 and the MACD histogram over the closes
//   4. Classify trend / momentum / RSI state at the last index
//   5. Derive stop-loss / take-profit from the last 10 highs/lows and EMA50
//
// Pure function: no state survives the call, so identical input always yields
// an identical Signal.
// =============================================================================

use tracing::debug;

use super::signal::{Direction, RiskLevels, Signal};
use crate::error::EngineError;
use crate::indicators::{ema, macd_default, rsi, IndicatorSeries};
use crate::market_data::Candle;

/// Minimum candles before any directional call is attempted.
pub const MIN_CANDLES: usize = 60;
/// Trailing window of highs/lows used for stop placement.
pub const RISK_LOOKBACK: usize = 10;
/// Take-profit distance as a multiple of the stop distance.
pub const RISK_REWARD: f64 = 1.5;

pub const FAST_EMA_PERIOD: usize = 20;
pub const SLOW_EMA_PERIOD: usize = 50;
pub const RSI_PERIOD: usize = 14;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
/// Long calls get the boost while RSI is below this.
pub const RSI_LONG_BOOST_BELOW: f64 = 60.0;
/// Short calls get the boost while RSI is above this.
pub const RSI_SHORT_BOOST_ABOVE: f64 = 40.0;

pub const INSUFFICIENT_HISTORY_CONFIDENCE: f64 = 0.3;
pub const NEUTRAL_CONFIDENCE: f64 = 0.45;
pub const DIRECTIONAL_BASE_CONFIDENCE: f64 = 0.7;
pub const CONFIDENCE_BOOST: f64 = 0.1;
pub const MAX_CONFIDENCE_BOOST: f64 = 0.2;

pub const INSUFFICIENT_HISTORY: &str = "insufficient history";
pub const NO_CONVERGENCE: &str = "no clear convergence of signals";

/// Indicator readings at the evaluation index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub price: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub histogram: f64,
}

/// Analyze a chronological (oldest-first) candle sequence.
///
/// # Errors
/// `EngineError::InvalidInput` when a candle at or beyond the 60-candle floor
/// carries a non-finite field or its `time` does not strictly increase.
/// Sequences shorter than the floor are never an error.
pub fn analyze(candles: &[Candle]) -> Result<Signal, EngineError> {
    // ── 1. Guard ─────────────────────────────────────────────────────────
    if candles.len() < MIN_CANDLES {
        debug!(count = candles.len(), "insufficient history for analysis");
        return Ok(Signal::neutral(
            INSUFFICIENT_HISTORY_CONFIDENCE,
            INSUFFICIENT_HISTORY,
        ));
    }

    // ── 2. Validate ──────────────────────────────────────────────────────
    validate_sequence(candles)?;

    // ── 3. Indicators ────────────────────────────────────────────────────
    let readings = compute_readings(candles)?;

    // ── 4. Classify ──────────────────────────────────────────────────────
    let (direction, confidence, rationale) = classify(&readings);

    debug!(
        ema20 = readings.ema_fast,
        ema50 = readings.ema_slow,
        rsi = readings.rsi,
        histogram = readings.histogram,
        direction = %direction,
        confidence,
        "signal classified"
    );

    // ── 5. Risk levels ───────────────────────────────────────────────────
    let risk = risk_levels(direction, &readings, candles);
    Ok(Signal::from_parts(direction, confidence, risk, rationale))
}

/// Reject sequences that would otherwise propagate NaN or misorder history.
pub fn validate_sequence(candles: &[Candle]) -> Result<(), EngineError> {
    for (i, c) in candles.iter().enumerate() {
        if !c.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "candle {i} (time {}) has a non-finite field",
                c.time
            )));
        }
        if i > 0 && c.time <= candles[i - 1].time {
            return Err(EngineError::InvalidInput(format!(
                "candle {i} time {} does not increase over previous {}",
                c.time,
                candles[i - 1].time
            )));
        }
    }
    Ok(())
}

/// Compute the indicator readings at the last index.
pub fn compute_readings(candles: &[Candle]) -> Result<Readings, EngineError> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let i = closes
        .len()
        .checked_sub(1)
        .ok_or_else(|| EngineError::InvalidInput("empty candle sequence".into()))?;

    let ema_fast = ema(&closes, FAST_EMA_PERIOD);
    let ema_slow = ema(&closes, SLOW_EMA_PERIOD);
    let rsi_series = rsi(&closes, RSI_PERIOD);
    let histogram = macd_default(&closes).histogram;

    Ok(Readings {
        price: closes[i],
        ema_fast: value_at(&ema_fast, i, "EMA20")?,
        ema_slow: value_at(&ema_slow, i, "EMA50")?,
        rsi: value_at(&rsi_series, i, "RSI14")?,
        histogram: value_at(&histogram, i, "MACD histogram")?,
    })
}

fn value_at(series: &IndicatorSeries, i: usize, name: &str) -> Result<f64, EngineError> {
    series
        .get(i)
        .copied()
        .flatten()
        .ok_or_else(|| EngineError::InvalidInput(format!("{name} has no value at index {i}")))
}

/// Map readings to a direction, raw confidence and rationale.
pub fn classify(r: &Readings) -> (Direction, f64, Vec<String>) {
    let trend_up = r.ema_fast > r.ema_slow;
    let trend_down = r.ema_fast < r.ema_slow;

    if trend_up && r.histogram > 0.0 && r.rsi < RSI_OVERBOUGHT {
        let boost = if r.rsi < RSI_LONG_BOOST_BELOW {
            CONFIDENCE_BOOST
        } else {
            0.0
        };
        let rationale = vec![
            "uptrend (EMA20 above EMA50)".to_string(),
            "positive momentum (MACD>0)".to_string(),
            "RSI not overbought".to_string(),
        ];
        return (
            Direction::Long,
            DIRECTIONAL_BASE_CONFIDENCE + boost.min(MAX_CONFIDENCE_BOOST),
            rationale,
        );
    }

    if trend_down && r.histogram < 0.0 && r.rsi > RSI_OVERSOLD {
        let boost = if r.rsi > RSI_SHORT_BOOST_ABOVE {
            CONFIDENCE_BOOST
        } else {
            0.0
        };
        let rationale = vec![
            "downtrend (EMA20 below EMA50)".to_string(),
            "negative momentum (MACD<0)".to_string(),
            "RSI not oversold".to_string(),
        ];
        return (
            Direction::Short,
            DIRECTIONAL_BASE_CONFIDENCE + boost.min(MAX_CONFIDENCE_BOOST),
            rationale,
        );
    }

    (
        Direction::Neutral,
        NEUTRAL_CONFIDENCE,
        vec![NO_CONVERGENCE.to_string()],
    )
}

/// Stop-loss / take-profit for a directional call; `None` for neutral.
pub fn risk_levels(direction: Direction, r: &Readings, candles: &[Candle]) -> Option<RiskLevels> {
    let window = &candles[candles.len().saturating_sub(RISK_LOOKBACK)..];
    match direction {
        Direction::Long => {
            let recent_low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            let stop_loss = recent_low.min(r.ema_slow);
            let risk = r.price - stop_loss;
            Some(RiskLevels {
                stop_loss,
                take_profit: r.price + risk * RISK_REWARD,
            })
        }
        Direction::Short => {
            let recent_high = window
                .iter()
                .map(|c| c.high)
                .fold(f64::NEG_INFINITY, f64::max);
            let stop_loss = recent_high.max(r.ema_slow);
            let risk = stop_loss - r.price;
            Some(RiskLevels {
                stop_loss,
                take_profit: r.price - risk * RISK_REWARD,
            })
        }
        Direction::Neutral => None,
    }
}
