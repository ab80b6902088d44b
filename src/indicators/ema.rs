// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   k     = 2 / (period + 1)
//   EMA_0 = value_0
//   EMA_t = value_t * k + EMA_{t-1} * (1 - k)
//
// The recurrence is seeded with the FIRST value (not an SMA of the first
// `period` values) and runs over the whole history.  Results before index
// `period - 1` are suppressed from the output, but they still feed the
// recurrence, so the value at `period - 1` is the full recursive EMA.
// =============================================================================

use super::IndicatorSeries;

/// Compute the EMA series for `values` and look-back `period`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - `values.len() < period` => all `None`
pub fn ema(values: &[f64], period: usize) -> IndicatorSeries {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut prev: Option<f64> = None;
    for (i, &value) in values.iter().enumerate() {
        let current = match prev {
            None => value,
            Some(p) => value * k + p * (1.0 - k),
        };
        prev = Some(current);
        if i + 1 >= period {
            out[i] = Some(current);
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert_eq!(ema(&[1.0, 2.0, 3.0], 0), vec![None, None, None]);
    }

    #[test]
    fn ema_insufficient_data() {
        assert_eq!(ema(&[1.0, 2.0], 5), vec![None, None]);
    }

    #[test]
    fn ema_seeded_from_first_value_not_sma() {
        // period 3 => k = 0.5
        //   t0: 10
        //   t1: 11*0.5 + 10*0.5   = 10.5
        //   t2: 12*0.5 + 10.5*0.5 = 11.25   (an SMA seed would give 11.0)
        //   t3: 13*0.5 + 11.25*0.5 = 12.125
        let out = ema(&[10.0, 11.0, 12.0, 13.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 11.25).abs() < 1e-10);
        assert!((out[3].unwrap() - 12.125).abs() < 1e-10);
    }

    #[test]
    fn ema_period_one_tracks_input() {
        let values = [4.0, 8.0, 15.0, 16.0];
        let out = ema(&values, 1);
        for (o, v) in out.iter().zip(values.iter()) {
            assert!((o.unwrap() - v).abs() < 1e-10);
        }
    }

    #[test]
    fn ema_constant_series_equals_constant() {
        let values = vec![42.5; 80];
        for period in [5, 20, 50] {
            let out = ema(&values, period);
            assert_eq!(out.len(), values.len());
            for (i, v) in out.iter().enumerate() {
                if i + 1 < period {
                    assert!(v.is_none());
                } else {
                    assert!((v.unwrap() - 42.5).abs() < 1e-9, "period {period} index {i}");
                }
            }
        }
    }

    #[test]
    fn ema_lags_a_rising_series() {
        let values: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let fast = ema(&values, 20);
        let slow = ema(&values, 50);
        let last = values.len() - 1;
        assert!(fast[last].unwrap() < values[last]);
        assert!(fast[last].unwrap() > slow[last].unwrap());
    }
}
