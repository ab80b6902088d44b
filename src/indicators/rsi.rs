// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — For changes 1..=period, accumulate raw gains and losses.
// Step 2 — At index `period`, emit the first value from the plain averages.
//          A zero average loss is floored to 1e-12.
// Step 3 — After that, apply Wilder's smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
//          A zero average loss substitutes RS = 1e6.
// Step 4 — RSI = 100 - 100 / (1 + RS)
// =============================================================================

use super::IndicatorSeries;

/// Default RSI look-back.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Floor applied to the seed average loss so the first RS is finite.
const SEED_LOSS_FLOOR: f64 = 1e-12;

/// RS substituted once smoothing is running and the average loss is zero.
const ZERO_LOSS_RS: f64 = 1e6;

/// Compute the RSI series for `values` and `period`.
///
/// Index-aligned with the input; indices `< period` are `None`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - `values.len() <= period` => all `None` (fewer than `period` changes)
pub fn rsi(values: &[f64], period: usize) -> IndicatorSeries {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let period_f = period as f64;
    let mut gains = 0.0;
    let mut losses = 0.0;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..values.len() {
        let change = values[i] - values[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i <= period {
            gains += gain;
            losses += loss;
            if i == period {
                avg_gain = gains / period_f;
                avg_loss = losses / period_f;
                let floored = if avg_loss == 0.0 { SEED_LOSS_FLOOR } else { avg_loss };
                out[i] = Some(rsi_from_rs(avg_gain / floored));
            }
        } else {
            avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
            avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;
            let rs = if avg_loss == 0.0 {
                ZERO_LOSS_RS
            } else {
                avg_gain / avg_loss
            };
            out[i] = Some(rsi_from_rs(rs));
        }
    }
    out
}

fn rsi_from_rs(rs: f64) -> f64 {
    100.0 - 100.0 / (1.0 + rs)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert_eq!(rsi(&[1.0, 2.0, 3.0], 0), vec![None, None, None]);
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 changes < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(rsi(&closes, 14).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_warm_up_ends_at_period() {
        let closes: Vec<f64> = (0..30).map(|x| 100.0 + (x % 3) as f64).collect();
        let out = rsi(&closes, 14);
        assert_eq!(out.len(), 30);
        assert!(out[..14].iter().all(Option::is_none));
        assert!(out[14..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains_approaches_100() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        for v in rsi(&closes, 14).into_iter().flatten() {
            assert!(v > 99.99 && v <= 100.0, "expected ~100, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for v in rsi(&closes, 14).into_iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_seed_value_matches_plain_averages() {
        // Period 4, changes: +1, -2, +3, -1 => gains 4, losses 3
        // RS = (4/4) / (3/4) = 4/3 => RSI = 100 - 100 / (7/3) = 57.142857...
        let closes = [10.0, 11.0, 9.0, 12.0, 11.0];
        let out = rsi(&closes, 4);
        assert!((out[4].unwrap() - 400.0 / 7.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_wilder_step() {
        // Continue the series above with a +2 change.
        //   avg_gain = (1.0 * 3 + 2) / 4 = 1.25
        //   avg_loss = (0.75 * 3 + 0) / 4 = 0.5625
        let closes = [10.0, 11.0, 9.0, 12.0, 11.0, 13.0];
        let out = rsi(&closes, 4);
        let rs = 1.25 / 0.5625;
        let expected = 100.0 - 100.0 / (1.0 + rs);
        assert!((out[5].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13, 43.90, 44.75,
        ];
        for v in rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    /// Deterministic random walk from a 64-bit LCG; steps in [-1.5, 1.5).
    fn lcg_walk(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        let mut price = 100.0;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
                price += (unit - 0.5) * 3.0;
                price
            })
            .collect()
    }

    #[test]
    fn rsi_stays_bounded_over_long_series() {
        let zigzag: Vec<f64> = (0..500)
            .map(|i| {
                // Alternating steps with a drift that flips every 100 points.
                let drift = if (i / 100) % 2 == 0 { 0.3 } else { -0.3 };
                let swing = if i % 2 == 0 { 1.0 } else { -1.0 };
                200.0 + drift * i as f64 + swing
            })
            .collect();

        for closes in [lcg_walk(600, 7), lcg_walk(600, 0xdead_beef), zigzag] {
            let out = rsi(&closes, DEFAULT_RSI_PERIOD);
            assert_eq!(out.len(), closes.len());
            assert!(out[..DEFAULT_RSI_PERIOD].iter().all(Option::is_none));
            for (i, v) in out.iter().enumerate().skip(DEFAULT_RSI_PERIOD) {
                let v = v.unwrap_or_else(|| panic!("missing RSI at {i}"));
                assert!((0.0..=100.0).contains(&v), "RSI {v} out of range at {i}");
            }
        }
    }
}
