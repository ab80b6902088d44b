// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Arithmetic mean of the trailing `period` values.  The window sum is
// maintained incrementally (add the incoming value, subtract the one leaving
// the window) so a full series costs O(N).
// =============================================================================

use super::IndicatorSeries;

/// Compute the SMA series for `values` over a trailing window of `period`.
///
/// The output is index-aligned with the input. Indices `< period - 1` are
/// `None` (warm-up); every later index carries the mean of exactly the last
/// `period` values.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - `values.len() < period` => all `None`
pub fn sma(values: &[f64], period: usize) -> IndicatorSeries {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let divisor = period as f64;
    let mut sum = 0.0;
    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out[i] = Some(sum / divisor);
        }
    }
    out
}
