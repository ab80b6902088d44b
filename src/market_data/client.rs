// =============================================================================
// Market-Data Client — provider adapter in front of the signal engine
// =============================================================================
//
// Resolves (symbol, market, interval) to an upstream provider, fetches the raw
// payload, and normalizes it into a chronological `CandleSeries`:
//   crypto                    -> Binance klines
//   stock / forex / commodity -> Yahoo chart
//
// Every upstream failure (transport, non-2xx, unparseable body, local
// rate-limit refusal) surfaces as `EngineError::DataUnavailable`.  Rows that
// fail `Candle::validate` are dropped here so they never reach the engine.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::binance;
use super::candle::{sort_and_dedup, Candle, CandleSeries};
use super::rate_limit::UsedWeightTracker;
use super::yahoo;
use crate::error::EngineError;
use crate::runtime_config::RuntimeConfig;
use crate::types::{Interval, Market};

#[derive(Clone)]
pub struct MarketDataClient {
    http: reqwest::Client,
    binance_base_url: String,
    yahoo_base_url: String,
    candle_limit: u32,
    binance_weight: Arc<UsedWeightTracker>,
}

impl MarketDataClient {
    pub fn new(config: &RuntimeConfig) -> Result<Self, EngineError> {
        let mut default_headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| EngineError::Config(format!("invalid user_agent: {e}")))?;
        default_headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EngineError::Config(format!("failed to build HTTP client: {e}")))?;

        debug!(
            binance = %config.binance_base_url,
            yahoo = %config.yahoo_base_url,
            "MarketDataClient initialised"
        );

        Ok(Self {
            http,
            binance_base_url: config.binance_base_url.clone(),
            yahoo_base_url: config.yahoo_base_url.clone(),
            candle_limit: config.candle_limit,
            binance_weight: Arc::new(UsedWeightTracker::new()),
        })
    }

    /// Shared handle to the Binance request-weight tracker.
    pub fn binance_weight(&self) -> Arc<UsedWeightTracker> {
        self.binance_weight.clone()
    }

    /// Fetch, normalize and validate candles for one symbol/interval.
    #[instrument(skip(self), name = "market_data::fetch_candles")]
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        market: Market,
        interval: Interval,
    ) -> Result<CandleSeries, EngineError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(EngineError::InvalidInput("symbol must not be empty".into()));
        }

        let (provider_symbol, raw) = match market {
            Market::Crypto => {
                let candles = self.fetch_binance(&symbol, interval).await?;
                (symbol, candles)
            }
            Market::Stock | Market::Forex | Market::Commodity => {
                let mapped = yahoo::map_symbol(&symbol, market);
                let candles = self.fetch_yahoo(&mapped, interval).await?;
                (mapped, candles)
            }
        };

        let candles = sort_and_dedup(drop_invalid(raw));
        debug!(symbol = %provider_symbol, count = candles.len(), "candles normalised");

        Ok(CandleSeries {
            symbol: provider_symbol,
            market,
            interval,
            candles,
        })
    }

    async fn fetch_binance(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Vec<Candle>, EngineError> {
        if !self.binance_weight.try_reserve(binance::KLINES_WEIGHT) {
            return Err(EngineError::data_unavailable(
                binance::PROVIDER,
                "request weight limit reached, retry after the minute rolls over",
            ));
        }
        let url = binance::klines_url(&self.binance_base_url, symbol, interval, self.candle_limit)?;
        let (headers, body) = self.get_json(binance::PROVIDER, url).await?;
        self.binance_weight.update_from_headers(&headers);
        binance::candles_from_klines(&body)
    }

    async fn fetch_yahoo(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Vec<Candle>, EngineError> {
        let url = yahoo::chart_url(&self.yahoo_base_url, symbol, interval)?;
        let (_, body) = self.get_json(yahoo::PROVIDER, url).await?;
        Ok(yahoo::candles_from_chart(&body))
    }

    async fn get_json(
        &self,
        provider: &'static str,
        url: Url,
    ) -> Result<(HeaderMap, Value), EngineError> {
        let resp = self.http.get(url.clone()).send().await.map_err(|e| {
            error!(provider, url = %url, error = %e, "upstream request failed");
            EngineError::data_unavailable(provider, format!("request failed: {e}"))
        })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(provider, %status, "upstream returned an error status");
            return Err(EngineError::data_unavailable(
                provider,
                format!("HTTP {status}: {}", truncate(&body, 200)),
            ));
        }

        let body: Value = resp.json().await.map_err(|e| {
            error!(provider, error = %e, "failed to parse upstream body");
            EngineError::data_unavailable(provider, format!("unparseable response: {e}"))
        })?;

        Ok((headers, body))
    }
}

impl std::fmt::Debug for MarketDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataClient")
            .field("binance_base_url", &self.binance_base_url)
            .field("yahoo_base_url", &self.yahoo_base_url)
            .field("candle_limit", &self.candle_limit)
            .finish()
    }
}

/// Drop rows that would violate the engine's input contract.
fn drop_invalid(candles: Vec<Candle>) -> Vec<Candle> {
    candles
        .into_iter()
        .filter(|c| match c.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "dropping malformed candle");
                false
            }
        })
        .collect()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
