// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
//   MACD line   = EMA(fast) - EMA(slow)          where both are present
//   Signal line = EMA(signal) of the MACD line with absent entries as 0.0
//   Histogram   = MACD line - Signal line         where both are present
//
// The signal line is smoothed over a zero-filled copy of the MACD line.  Over
// the slow EMA's warm-up the filled line is all zeros, which drags the signal
// line towards zero for a while after the MACD line appears.  Consumers depend
// on these exact numbers; do not replace the fill with a warm-up skip.
// =============================================================================

use serde::Serialize;

use super::ema::ema;
use super::IndicatorSeries;

pub const DEFAULT_FAST_PERIOD: usize = 12;
pub const DEFAULT_SLOW_PERIOD: usize = 26;
pub const DEFAULT_SIGNAL_PERIOD: usize = 9;

/// The three index-aligned MACD series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdSeries {
    pub macd_line: IndicatorSeries,
    pub signal_line: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// Compute MACD with explicit fast / slow / signal periods.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let ema_fast = ema(values, fast);
    let ema_slow = ema(values, slow);

    let macd_line: IndicatorSeries = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let filled: Vec<f64> = macd_line.iter().map(|v| v.unwrap_or(0.0)).collect();
    let signal_line = ema(&filled, signal);

    let histogram = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    MacdSeries {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Compute MACD with the standard (12, 26, 9) periods.
pub fn macd_default(values: &[f64]) -> MacdSeries {
    macd(
        values,
        DEFAULT_FAST_PERIOD,
        DEFAULT_SLOW_PERIOD,
        DEFAULT_SIGNAL_PERIOD,
    )
}
