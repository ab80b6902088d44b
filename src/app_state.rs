// =============================================================================
// Central Application State — signal service
// =============================================================================
//
// Everything the HTTP handlers share. The analysis engine itself is stateless;
// what lives here is service plumbing: configuration, the market-data client,
// counters for the health endpoint and a bounded audit trail of recent calls.
//
// Thread safety:
//   - Atomic counter for lock-free request accounting.
//   - parking_lot::RwLock for the audit trail.
//   - `MarketDataClient` is cheap to clone and internally Arc-shared.
// =============================================================================

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::error::EngineError;
use crate::market_data::MarketDataClient;
use crate::runtime_config::RuntimeConfig;
use crate::signals::Signal;
use crate::types::{Interval, Market};

/// Maximum number of analysis records retained for `/signals/recent`.
pub const MAX_RECENT_ANALYSES: usize = 100;

// =============================================================================
// Analysis Record
// =============================================================================

/// One completed analysis, as returned by `/signal` and kept in the audit
/// trail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub symbol: String,
    pub market: Market,
    pub interval: Interval,
    pub generated_at: DateTime<Utc>,
    pub signal: Signal,
    pub rationale_text: String,
    /// Close of the last candle analysed, if any.
    pub last_price: Option<f64>,
}

impl AnalysisRecord {
    pub fn new(
        symbol: String,
        market: Market,
        interval: Interval,
        signal: Signal,
        last_price: Option<f64>,
    ) -> Self {
        let rationale_text = signal.rationale_text();
        Self {
            id: Uuid::new_v4().to_string(),
            symbol,
            market,
            interval,
            generated_at: Utc::now(),
            signal,
            rationale_text,
            last_price,
        }
    }
}

// =============================================================================
// AppState
// =============================================================================

/// Shared across all handlers via `Arc<AppState>`.
pub struct AppState {
    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: RuntimeConfig,
    /// Bearer token required on non-public routes. `None` leaves the API open.
    pub api_token: Option<String>,

    // ── Market Data ─────────────────────────────────────────────────────
    pub market_data: MarketDataClient,

    // ── Accounting ──────────────────────────────────────────────────────
    pub analyses_served: AtomicU64,
    pub recent_analyses: RwLock<VecDeque<AnalysisRecord>>,

    // ── Timing ──────────────────────────────────────────────────────────
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, api_token: Option<String>) -> Result<Self, EngineError> {
        let market_data = MarketDataClient::new(&config)?;
        let api_token = api_token.filter(|t| !t.is_empty());

        Ok(Self {
            runtime_config: config,
            api_token,
            market_data,
            analyses_served: AtomicU64::new(0),
            recent_analyses: RwLock::new(VecDeque::with_capacity(MAX_RECENT_ANALYSES)),
            start_time: std::time::Instant::now(),
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn analyses_served(&self) -> u64 {
        self.analyses_served.load(Ordering::Relaxed)
    }

    // ── Analysis Audit ──────────────────────────────────────────────────

    /// Record a completed analysis. Newest first; the oldest entry is evicted
    /// once [`MAX_RECENT_ANALYSES`] is reached.
    pub fn push_analysis(&self, record: AnalysisRecord) {
        self.analyses_served.fetch_add(1, Ordering::Relaxed);

        let mut recent = self.recent_analyses.write();
        recent.push_front(record);
        recent.truncate(MAX_RECENT_ANALYSES);
    }

    /// Newest-first copy of the audit trail.
    pub fn recent_analyses(&self) -> Vec<AnalysisRecord> {
        self.recent_analyses.read().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(RuntimeConfig::default(), None).unwrap()
    }

    fn record(symbol: &str) -> AnalysisRecord {
        AnalysisRecord::new(
            symbol.to_string(),
            Market::Crypto,
            Interval::H1,
            Signal::neutral(0.3, "insufficient history"),
            Some(1.0),
        )
    }

    #[test]
    fn audit_trail_is_newest_first_and_bounded() {
        let s = state();
        for i in 0..(MAX_RECENT_ANALYSES + 5) {
            s.push_analysis(record(&format!("SYM{i}")));
        }
        let recent = s.recent_analyses();
        assert_eq!(recent.len(), MAX_RECENT_ANALYSES);
        assert_eq!(recent[0].symbol, format!("SYM{}", MAX_RECENT_ANALYSES + 4));
        assert_eq!(recent.last().unwrap().symbol, "SYM5");
        assert_eq!(s.analyses_served(), (MAX_RECENT_ANALYSES + 5) as u64);
    }

    #[test]
    fn record_serialises_camel_case() {
        let json = serde_json::to_value(record("BTCUSDT")).unwrap();
        assert_eq!(json["symbol"], "BTCUSDT");
        assert_eq!(json["market"], "crypto");
        assert_eq!(json["interval"], "1h");
        assert_eq!(json["rationaleText"], "insufficient history");
        assert_eq!(json["lastPrice"], 1.0);
        assert_eq!(json["signal"]["direction"], "neutral");
        assert!(json["generatedAt"].is_string());
        assert_eq!(json["id"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn empty_token_leaves_api_open() {
        let s = AppState::new(RuntimeConfig::default(), Some(String::new())).unwrap();
        assert!(s.api_token.is_none());
    }
}
