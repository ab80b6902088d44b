// =============================================================================
// Binance Klines — crypto candles
// =============================================================================
//
// GET /api/v3/klines (public, weight 2 for limit <= 500).  The response is an
// array of arrays:
//   [0] openTime (ms), [1] open, [2] high, [3] low, [4] close, [5] volume,
//   [6] closeTime, ...
// Prices and volume arrive as decimal strings. A missing or unparseable
// volume becomes 0.
// =============================================================================

use reqwest::Url;
use serde_json::Value;
use tracing::warn;

use super::candle::Candle;
use crate::error::EngineError;
use crate::types::Interval;

pub const PROVIDER: &str = "binance";

/// Request weight Binance charges for a klines call with limit <= 500.
pub const KLINES_WEIGHT: u32 = 2;

/// Build the klines URL for `symbol` / `interval`.
pub fn klines_url(
    base_url: &str,
    symbol: &str,
    interval: Interval,
    limit: u32,
) -> Result<Url, EngineError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| EngineError::Config(format!("invalid Binance base URL '{base_url}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| EngineError::Config(format!("Binance base URL '{base_url}' cannot be a base")))?
        .pop_if_empty()
        .extend(["api", "v3", "klines"]);
    url.query_pairs_mut()
        .append_pair("symbol", symbol)
        .append_pair("interval", interval.as_str())
        .append_pair("limit", &limit.to_string());
    Ok(url)
}

/// Normalize a klines response body into candles.
///
/// Rows that are too short or carry an unparseable number are skipped with a
/// warning; a body that is not an array at all is an error.
pub fn candles_from_klines(body: &Value) -> Result<Vec<Candle>, EngineError> {
    let rows = body
        .as_array()
        .ok_or_else(|| EngineError::data_unavailable(PROVIDER, "klines response is not an array"))?;

    let mut candles = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match parse_row(row) {
            Some(candle) => candles.push(candle),
            None => warn!(index = i, "skipping malformed kline row"),
        }
    }
    Ok(candles)
}

fn parse_row(row: &Value) -> Option<Candle> {
    let arr = row.as_array()?;
    if arr.len() < 5 {
        return None;
    }
    let time = arr[0].as_i64()?;
    let volume = arr.get(5).and_then(parse_str_f64).unwrap_or(0.0);
    Some(Candle::new(
        time,
        parse_str_f64(&arr[1])?,
        parse_str_f64(&arr[2])?,
        parse_str_f64(&arr[3])?,
        parse_str_f64(&arr[4])?,
        volume,
    ))
}

/// Parse a JSON value that may be either a string or a number into `f64`.
fn parse_str_f64(val: &Value) -> Option<f64> {
    match val {
        Value::String(s) => s.parse::<f64>().ok(),
        other => other.as_f64(),
    }
}
