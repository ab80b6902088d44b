// =============================================================================
// Yahoo Finance Chart — stock / forex / commodity candles
// =============================================================================
//
// GET /v8/finance/chart/{symbol}?interval=..&range=..
//
// The response is column-oriented:
//   chart.result[0].timestamp                 (seconds)
//   chart.result[0].indicators.quote[0].open  (nullable numbers)
//   ... high / low / close / volume
// Any row with a null open/high/low/close, or a timestamp that overflows
// once converted to milliseconds, is dropped; null volume becomes 0.
// =============================================================================

use reqwest::Url;
use serde_json::Value;

use super::candle::Candle;
use crate::error::EngineError;
use crate::types::{Interval, Market};

pub const PROVIDER: &str = "yahoo";

/// Map a user-facing symbol onto Yahoo's naming.
///
/// - forex pairs without a `=` suffix get `=X` (`EURUSD` -> `EURUSD=X`)
/// - the `GOLD` commodity becomes the front-month future `GC=F`
pub fn map_symbol(symbol: &str, market: Market) -> String {
    match market {
        Market::Forex if !symbol.contains('=') => format!("{symbol}=X"),
        Market::Commodity if symbol.eq_ignore_ascii_case("GOLD") => "GC=F".to_string(),
        _ => symbol.to_string(),
    }
}

/// History window requested for each interval.
pub fn range_for(interval: Interval) -> &'static str {
    match interval {
        Interval::M1 | Interval::M5 | Interval::M15 => "5d",
        Interval::H1 | Interval::H4 => "1mo",
        Interval::D1 => "6mo",
    }
}

pub fn chart_url(base_url: &str, symbol: &str, interval: Interval) -> Result<Url, EngineError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| EngineError::Config(format!("invalid Yahoo base URL '{base_url}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| EngineError::Config(format!("Yahoo base URL '{base_url}' cannot be a base")))?
        .pop_if_empty()
        .extend(["v8", "finance", "chart", symbol]);
    url.query_pairs_mut()
        .append_pair("interval", interval.as_str())
        .append_pair("range", range_for(interval));
    Ok(url)
}

/// Normalize a chart response into candles. A response without a result
/// yields an empty vector.
pub fn candles_from_chart(body: &Value) -> Vec<Candle> {
    let result = &body["chart"]["result"][0];
    if result.is_null() {
        return Vec::new();
    }

    let empty = Vec::new();
    let timestamps = result["timestamp"].as_array().unwrap_or(&empty);
    let quote = &result["indicators"]["quote"][0];
    let column = |name: &str| quote[name].as_array().cloned().unwrap_or_default();
    let (open, high, low, close, volume) = (
        column("open"),
        column("high"),
        column("low"),
        column("close"),
        column("volume"),
    );

    let field = |col: &[Value], i: usize| col.get(i).and_then(Value::as_f64);

    let mut candles = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(ms) = ts.as_i64().and_then(|secs| secs.checked_mul(1000)) else {
            continue;
        };
        let (Some(o), Some(h), Some(l), Some(c)) = (
            field(&open, i),
            field(&high, i),
            field(&low, i),
            field(&close, i),
        ) else {
            continue;
        };
        let v = field(&volume, i).unwrap_or(0.0);
        candles.push(Candle::new(ms, o, h, l, c, v));
    }
    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn symbol_mapping() {
        assert_eq!(map_symbol("EURUSD", Market::Forex), "EURUSD=X");
        assert_eq!(map_symbol("EURUSD=X", Market::Forex), "EURUSD=X");
        assert_eq!(map_symbol("GOLD", Market::Commodity), "GC=F");
        assert_eq!(map_symbol("gold", Market::Commodity), "GC=F");
        assert_eq!(map_symbol("CL=F", Market::Commodity), "CL=F");
        assert_eq!(map_symbol("AAPL", Market::Stock), "AAPL");
    }

    #[test]
    fn range_selection() {
        assert_eq!(range_for(Interval::M1), "5d");
        assert_eq!(range_for(Interval::M15), "5d");
        assert_eq!(range_for(Interval::H1), "1mo");
        assert_eq!(range_for(Interval::H4), "1mo");
        assert_eq!(range_for(Interval::D1), "6mo");
    }

    #[test]
    fn chart_url_shape() {
        let url = chart_url("https://query1.finance.yahoo.com", "GC=F", Interval::D1).unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/GC=F");
        assert_eq!(url.query(), Some("interval=1d&range=6mo"));
    }

    #[test]
    fn parses_columns_and_drops_null_rows() {
        let body = json!({
            "chart": {
                "result": [{
                    "timestamp": [1700000000, 1700003600, 1700007200],
                    "indicators": {
                        "quote": [{
                            "open":   [10.0, null, 12.0],
                            "high":   [11.0, 12.5, 13.0],
                            "low":    [9.5, 10.5, 11.5],
                            "close":  [10.5, 12.0, 12.5],
                            "volume": [100, 200, null]
                        }]
                    }
                }],
                "error": null
            }
        });
        let candles = candles_from_chart(&body);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0], Candle::new(1_700_000_000_000, 10.0, 11.0, 9.5, 10.5, 100.0));
        assert_eq!(candles[1].time, 1_700_007_200_000);
        assert_eq!(candles[1].volume, 0.0);
    }

    #[test]
    fn overflowing_timestamp_row_is_dropped() {
        let body = json!({
            "chart": {
                "result": [{
                    "timestamp": [i64::MAX / 10, 1700000000],
                    "indicators": {
                        "quote": [{
                            "open":   [10.0, 11.0],
                            "high":   [11.0, 12.0],
                            "low":    [9.5, 10.5],
                            "close":  [10.5, 11.5],
                            "volume": [1, 2]
                        }]
                    }
                }]
            }
        });
        let candles = candles_from_chart(&body);
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].time, 1_700_000_000_000);
    }

    #[test]
    fn missing_result_is_empty() {
        let body = json!({"chart": {"result": null, "error": {"code": "Not Found"}}});
        assert!(candles_from_chart(&body).is_empty());
    }
}
