//! Market data abstractions and core types

use crate::core::error::{Result, UpstreamError};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Upstream hard limit on candles per request.
pub const MAX_KLINE_LIMIT: u32 = 1000;

/// Minimum number of positional fields in an upstream kline row.
const KLINE_FIELDS: usize = 9;

/// Latest traded price of one symbol, in its quote asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    #[serde(deserialize_with = "decimal")]
    pub price: f64,
}

/// Rolling 24 hour statistics for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerStats {
    pub symbol: String,
    #[serde(default, deserialize_with = "decimal")]
    pub price_change: f64,
    #[serde(deserialize_with = "decimal")]
    pub price_change_percent: f64,
    #[serde(deserialize_with = "decimal")]
    pub last_price: f64,
    #[serde(default, deserialize_with = "decimal")]
    pub open_price: f64,
    #[serde(default, deserialize_with = "decimal")]
    pub high_price: f64,
    #[serde(default, deserialize_with = "decimal")]
    pub low_price: f64,
    #[serde(default, deserialize_with = "decimal")]
    pub volume: f64,
    #[serde(default, deserialize_with = "decimal")]
    pub quote_volume: f64,
    #[serde(default)]
    pub count: i64,
}

/// One candlestick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,
    pub quote_volume: f64,
    #[serde(rename = "trades")]
    pub trade_count: i64,
}

impl Kline {
    /// Parses an upstream kline row such as
    /// `[1499040000000, "0.0163", "0.8", "0.0157", "0.0159", "148976.1", 1499644799999, "2434.1", 308, ...]`.
    pub fn from_row(row: &Value) -> Result<Self> {
        let fields = row
            .as_array()
            .ok_or_else(|| UpstreamError::Transport(format!("Kline row is not an array: {row}")))?;
        if fields.len() < KLINE_FIELDS {
            return Err(UpstreamError::Transport(format!(
                "Kline row has {} fields, expected at least {KLINE_FIELDS}",
                fields.len()
            )));
        }

        Ok(Kline {
            open_time: int_field(fields, 0)?,
            open: decimal_field(fields, 1)?,
            high: decimal_field(fields, 2)?,
            low: decimal_field(fields, 3)?,
            close: decimal_field(fields, 4)?,
            volume: decimal_field(fields, 5)?,
            close_time: int_field(fields, 6)?,
            quote_volume: decimal_field(fields, 7)?,
            trade_count: int_field(fields, 8)?,
        })
    }
}

fn int_field(fields: &[Value], index: usize) -> Result<i64> {
    let value = &fields[index];
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| {
            UpstreamError::Transport(format!("Kline field {index} is not an integer: {value}"))
        })
}

fn decimal_field(fields: &[Value], index: usize) -> Result<f64> {
    let value = &fields[index];
    parse_decimal(value).ok_or_else(|| {
        UpstreamError::Transport(format!("Kline field {index} is not a decimal: {value}"))
    })
}

/// Reads a decimal that the upstream may encode either as a JSON string or a number.
pub fn parse_decimal(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn decimal<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_decimal(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid decimal: {value}")))
}

/// Read access to an exchange's public market data.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote>;

    /// Best-effort batch lookup: symbols that fail are absent from the output.
    async fn get_prices(&self, symbols: &[String]) -> Result<Vec<PriceQuote>>;

    async fn get_24h_ticker(&self, symbol: &str) -> Result<TickerStats>;

    async fn get_all_tickers_24h(&self) -> Result<Vec<TickerStats>>;

    async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Vec<Kline>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_quote_accepts_string_and_number() {
        let quote: PriceQuote =
            serde_json::from_value(json!({"symbol": "BTCUSDT", "price": "50000.00"})).unwrap();
        assert_eq!(quote.price, 50000.0);

        let quote: PriceQuote =
            serde_json::from_value(json!({"symbol": "BTCUSDT", "price": 50000.5})).unwrap();
        assert_eq!(quote.price, 50000.5);

        let bad = serde_json::from_value::<PriceQuote>(json!({"symbol": "X", "price": "abc"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_ticker_stats_from_upstream_shape() {
        let ticker: TickerStats = serde_json::from_value(json!({
            "symbol": "ETHUSDT",
            "priceChange": "-12.50",
            "priceChangePercent": "-0.495",
            "lastPrice": "2500.00",
            "openPrice": "2512.50",
            "highPrice": "2550.00",
            "lowPrice": "2480.00",
            "volume": "1000.5",
            "quoteVolume": "2501250.0",
            "count": 1234
        }))
        .unwrap();

        assert_eq!(ticker.last_price, 2500.0);
        assert_eq!(ticker.price_change_percent, -0.495);
        assert_eq!(ticker.quote_volume, 2501250.0);
        assert_eq!(ticker.count, 1234);
    }

    #[test]
    fn test_kline_from_row() {
        let row = json!([
            1499040000000i64,
            "0.01634790",
            "0.80000000",
            "0.01575800",
            "0.01577100",
            "148976.11427815",
            1499644799999i64,
            "2434.19055334",
            308,
            "1756.87402397",
            "28.46694368",
            "0"
        ]);

        let kline = Kline::from_row(&row).unwrap();
        assert_eq!(kline.open_time, 1499040000000);
        assert_eq!(kline.open, 0.0163479);
        assert_eq!(kline.close, 0.015771);
        assert_eq!(kline.close_time, 1499644799999);
        assert_eq!(kline.trade_count, 308);
    }

    #[test]
    fn test_kline_row_too_short() {
        let row = json!([1499040000000i64, "1", "2", "0.5", "1.5", "10", 1499644799999i64, "15"]);
        let err = Kline::from_row(&row).unwrap_err();
        assert!(err.to_string().contains("has 8 fields"));
    }

    #[test]
    fn test_kline_serializes_with_trades_field() {
        let kline = Kline {
            open_time: 1,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
            close_time: 2,
            quote_volume: 15.0,
            trade_count: 3,
        };
        let value = serde_json::to_value(&kline).unwrap();
        assert_eq!(value["trades"], 3);
        assert_eq!(value["quote_volume"], 15.0);
    }
}
