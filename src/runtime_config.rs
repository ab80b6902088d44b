// =============================================================================
// Runtime Configuration — service settings loaded at startup
// =============================================================================
//
// Everything an operator may want to change without a rebuild: listen
// address, request defaults, upstream endpoints and HTTP client behaviour.
// Engine thresholds are constants in `signals::synthesizer`, not settings.
//
// Resolution order:
//   1. serde defaults
//   2. JSON file (`SIGNAL_CONFIG`, default `signal_config.json`)
//   3. environment overrides (`SIGNAL_BIND_ADDR`, `SIGNAL_BINANCE_URL`,
//      `SIGNAL_YAHOO_URL`)
//
// All fields carry `#[serde(default = ...)]` so a partial file still loads.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{Interval, Market};

pub const CONFIG_PATH_ENV: &str = "SIGNAL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "signal_config.json";

pub const BIND_ADDR_ENV: &str = "SIGNAL_BIND_ADDR";
pub const BINANCE_URL_ENV: &str = "SIGNAL_BINANCE_URL";
pub const YAHOO_URL_ENV: &str = "SIGNAL_YAHOO_URL";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

fn default_binance_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_yahoo_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "markets-ai/1.0".to_string()
}

fn default_candle_limit() -> u32 {
    500
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    // --- Request defaults ---------------------------------------------------

    /// Symbol used when a request omits `symbol`.
    #[serde(default = "default_symbol")]
    pub default_symbol: String,

    #[serde(default)]
    pub default_market: Market,

    #[serde(default)]
    pub default_interval: Interval,

    // --- Upstream providers -------------------------------------------------

    #[serde(default = "default_binance_base_url")]
    pub binance_base_url: String,

    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,

    /// Per-request timeout for upstream calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Sent as `User-Agent` on every upstream request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Number of klines requested from Binance.
    #[serde(default = "default_candle_limit")]
    pub candle_limit: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            default_symbol: default_symbol(),
            default_market: Market::default(),
            default_interval: Interval::default(),
            binance_base_url: default_binance_base_url(),
            yahoo_base_url: default_yahoo_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            candle_limit: default_candle_limit(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing or unparseable file is an error so the caller can fall back
    /// to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            default_symbol = %config.default_symbol,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply `SIGNAL_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = get(BIND_ADDR_ENV) {
            info!(bind_addr = %addr, "bind address overridden from environment");
            self.bind_addr = addr;
        }
        if let Some(url) = get(BINANCE_URL_ENV) {
            info!(url = %url, "Binance base URL overridden from environment");
            self.binance_base_url = url;
        }
        if let Some(url) = get(YAHOO_URL_ENV) {
            info!(url = %url, "Yahoo base URL overridden from environment");
            self.yahoo_base_url = url;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.default_symbol, "BTCUSDT");
        assert_eq!(cfg.default_market, Market::Crypto);
        assert_eq!(cfg.default_interval, Interval::H1);
        assert_eq!(cfg.binance_base_url, "https://api.binance.com");
        assert_eq!(cfg.yahoo_base_url, "https://query1.finance.yahoo.com");
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.user_agent, "markets-ai/1.0");
        assert_eq!(cfg.candle_limit, 500);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RuntimeConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "default_market": "forex", "default_interval": "4h", "candle_limit": 200 }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.default_market, Market::Forex);
        assert_eq!(cfg.default_interval, Interval::H4);
        assert_eq!(cfg.candle_limit, 200);
        assert_eq!(cfg.default_symbol, "BTCUSDT");
    }

    #[test]
    fn unknown_market_fails_to_parse() {
        let json = r#"{ "default_market": "bonds" }"#;
        assert!(serde_json::from_str::<RuntimeConfig>(json).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(RuntimeConfig::load("/nonexistent/signal_config.json").is_err());
    }

    #[test]
    fn overrides_replace_only_present_values() {
        let env: HashMap<&str, &str> = [
            (BIND_ADDR_ENV, "127.0.0.1:9000"),
            (YAHOO_URL_ENV, "http://localhost:1234"),
            (BINANCE_URL_ENV, "  "),
        ]
        .into_iter()
        .collect();

        let mut cfg = RuntimeConfig::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.yahoo_base_url, "http://localhost:1234");
        assert_eq!(cfg.binance_base_url, "https://api.binance.com");
    }
}
