// =============================================================================
// Request-Weight Tracker — keeps Binance kline fetches under the 1m budget
// =============================================================================
//
// Binance charges every REST call a request weight and reports the running
// per-minute total in the `X-MBX-USED-WEIGHT-1M` response header.  Each
// request first reserves its weight atomically and is refused if that would
// push the total past the hard limit; the header then raises the counter to
// the upstream's figure.  A background timer in the binary resets the
// counter every minute.
// =============================================================================

use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, warn};

/// Hard ceiling at which we refuse to send additional requests.
pub const WEIGHT_HARD_LIMIT: u32 = 6000;
/// Soft warning threshold.
pub const WEIGHT_WARN_THRESHOLD: u32 = 4800;

const USED_WEIGHT_HEADER: &str = "x-mbx-used-weight-1m";

/// Lock-free tracker of the upstream per-minute request weight.
pub struct UsedWeightTracker {
    used_weight_1m: AtomicU32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsedWeightSnapshot {
    pub used_weight_1m: u32,
    pub hard_limit: u32,
}

impl UsedWeightTracker {
    pub fn new() -> Self {
        Self {
            used_weight_1m: AtomicU32::new(0),
        }
    }

    /// Record the used weight reported by a Binance response.
    pub fn update_from_headers(&self, headers: &reqwest::header::HeaderMap) {
        let Some(weight) = headers
            .get(USED_WEIGHT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u32>().ok())
        else {
            return;
        };
        self.record(weight);
    }

    /// Store `weight` as the current per-minute usage. The counter never moves
    /// backwards here, so reservations for in-flight requests survive a
    /// header reporting an older total; only `reset_1m_weight` lowers it.
    pub fn record(&self, weight: u32) {
        let prev = self.used_weight_1m.fetch_max(weight, Ordering::Relaxed);
        if weight >= WEIGHT_WARN_THRESHOLD && prev < WEIGHT_WARN_THRESHOLD {
            warn!(
                used_weight = weight,
                hard_limit = WEIGHT_HARD_LIMIT,
                "request weight crossed warning threshold"
            );
        }
        debug!(used_weight_1m = weight, "request weight updated");
    }

    /// Atomically claim `weight` if it fits under the hard limit.
    ///
    /// Returns `false`, leaving the counter untouched, when the claim would
    /// exceed [`WEIGHT_HARD_LIMIT`].
    pub fn try_reserve(&self, weight: u32) -> bool {
        let claimed = self
            .used_weight_1m
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                let next = current.saturating_add(weight);
                (next <= WEIGHT_HARD_LIMIT).then_some(next)
            });
        match claimed {
            Ok(prev) => {
                let next = prev.saturating_add(weight);
                if next >= WEIGHT_WARN_THRESHOLD && prev < WEIGHT_WARN_THRESHOLD {
                    warn!(
                        used_weight = next,
                        hard_limit = WEIGHT_HARD_LIMIT,
                        "request weight crossed warning threshold"
                    );
                }
                true
            }
            Err(current) => {
                warn!(
                    current_weight = current,
                    requested_weight = weight,
                    hard_limit = WEIGHT_HARD_LIMIT,
                    "request blocked, would exceed rate limit"
                );
                false
            }
        }
    }

    /// Reset the 1-minute counter (call from a periodic timer).
    pub fn reset_1m_weight(&self) {
        self.used_weight_1m.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsedWeightSnapshot {
        UsedWeightSnapshot {
            used_weight_1m: self.used_weight_1m.load(Ordering::Relaxed),
            hard_limit: WEIGHT_HARD_LIMIT,
        }
    }
}

impl Default for UsedWeightTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UsedWeightTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsedWeightTracker")
            .field("used_weight_1m", &self.used_weight_1m.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[test]
    fn header_updates_counter() {
        let tracker = UsedWeightTracker::new();
        let mut headers = HeaderMap::new();
        headers.insert(USED_WEIGHT_HEADER, HeaderValue::from_static("1234"));
        tracker.update_from_headers(&headers);
        assert_eq!(tracker.snapshot().used_weight_1m, 1234);
    }

    #[test]
    fn missing_or_garbage_header_is_ignored() {
        let tracker = UsedWeightTracker::new();
        tracker.record(10);
        let mut headers = HeaderMap::new();
        tracker.update_from_headers(&headers);
        headers.insert(USED_WEIGHT_HEADER, HeaderValue::from_static("lots"));
        tracker.update_from_headers(&headers);
        assert_eq!(tracker.snapshot().used_weight_1m, 10);
    }

    #[test]
    fn blocks_requests_over_hard_limit() {
        let tracker = UsedWeightTracker::new();
        tracker.record(WEIGHT_HARD_LIMIT - 2);
        assert!(!tracker.try_reserve(3));
        assert_eq!(tracker.snapshot().used_weight_1m, WEIGHT_HARD_LIMIT - 2);
        assert!(tracker.try_reserve(2));
        tracker.reset_1m_weight();
        assert!(tracker.try_reserve(3));
    }

    #[test]
    fn reservation_is_consumed_by_the_first_caller() {
        let tracker = UsedWeightTracker::new();
        tracker.record(WEIGHT_HARD_LIMIT - 2);
        assert!(tracker.try_reserve(2));
        assert!(!tracker.try_reserve(2));
        assert_eq!(tracker.snapshot().used_weight_1m, WEIGHT_HARD_LIMIT);
    }

    #[test]
    fn concurrent_reservations_never_exceed_hard_limit() {
        let tracker = std::sync::Arc::new(UsedWeightTracker::new());
        tracker.record(WEIGHT_HARD_LIMIT - 10);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let t = tracker.clone();
                std::thread::spawn(move || t.try_reserve(2))
            })
            .collect();
        let granted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(granted, 5);
        assert_eq!(tracker.snapshot().used_weight_1m, WEIGHT_HARD_LIMIT);
    }

    #[test]
    fn stale_header_does_not_release_reservation() {
        let tracker = UsedWeightTracker::new();
        assert!(tracker.try_reserve(2));
        tracker.record(1);
        assert_eq!(tracker.snapshot().used_weight_1m, 2);
        tracker.record(40);
        assert_eq!(tracker.snapshot().used_weight_1m, 40);
    }
}
