use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::cache::TtlCache;
use crate::core::config::UpstreamConfig;
use crate::core::error::{Result, UpstreamError};
use crate::core::market::{Kline, MAX_KLINE_LIMIT, MarketDataProvider, PriceQuote, TickerStats};
use crate::providers::util::{AttemptError, RetryPolicy, with_retry};

/// Client for the Binance public market data API.
///
/// Every response is cached by request signature in the shared cache, so
/// identical requests inside the TTL window cost one upstream call, even
/// when they arrive while the first one is still in flight.
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
    cache: TtlCache<String, Value>,
    retry: RetryPolicy,
}

impl BinanceClient {
    pub fn new(config: &UpstreamConfig, cache: TtlCache<String, Value>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("coinrelay/0.1")
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(BinanceClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            cache,
            retry: RetryPolicy {
                max_attempts: config.max_attempts,
                base_delay: config.retry_base_delay(),
            },
        })
    }

    async fn request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|e| UpstreamError::Transport(format!("Invalid upstream URL: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        debug!("Requesting market data from {}", url);

        let client = &self.client;
        let url = &url;
        with_retry(
            || async move {
                let response = client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(AttemptError::Status { status, body });
                }

                let text = response.text().await?;
                let value = serde_json::from_str::<Value>(&text)
                    .map_err(|e| AttemptError::Decode(e.to_string()))?;
                Ok::<Value, AttemptError>(value)
            },
            &self.retry,
        )
        .await
    }

    /// Serves `key` from the cache, or fetches, decodes and stores it.
    ///
    /// Only responses that decode are stored.
    async fn fetch_cached<T, D>(
        &self,
        key: String,
        endpoint: &str,
        params: &[(&str, String)],
        decode: D,
    ) -> Result<T>
    where
        D: Fn(&Value) -> Result<T>,
    {
        let decode = &decode;
        let value = self
            .cache
            .get_or_fetch(key, move || async move {
                let value = self.request(endpoint, params).await?;
                decode(&value)?;
                Ok::<Value, UpstreamError>(value)
            })
            .await?;
        decode(&value)
    }
}

fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(UpstreamError::Validation(
            "Symbol must not be empty".to_string(),
        ));
    }
    Ok(symbol)
}

fn decode_as<T: DeserializeOwned>(value: &Value) -> Result<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| UpstreamError::Transport(format!("Unexpected upstream response: {e}")))
}

fn decode_tickers(value: &Value) -> Result<Vec<TickerStats>> {
    match value {
        Value::Array(_) => decode_as(value),
        _ => Ok(vec![decode_as(value)?]),
    }
}

fn decode_klines(value: &Value) -> Result<Vec<Kline>> {
    value
        .as_array()
        .ok_or_else(|| UpstreamError::Transport(format!("Kline response is not an array: {value}")))?
        .iter()
        .map(Kline::from_row)
        .collect()
}

#[async_trait]
impl MarketDataProvider for BinanceClient {
    #[instrument(name = "BinancePriceFetch", skip(self), fields(symbol = %symbol))]
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote> {
        let symbol = normalize_symbol(symbol)?;
        self.fetch_cached(
            format!("price:{symbol}"),
            "/ticker/price",
            &[("symbol", symbol.clone())],
            decode_as::<PriceQuote>,
        )
        .await
        .map_err(|e| e.context(&format!("Failed to fetch price for {symbol}")))
    }

    #[instrument(name = "BinancePricesFetch", skip(self))]
    async fn get_prices(&self, symbols: &[String]) -> Result<Vec<PriceQuote>> {
        let mut wanted: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = symbol.trim().to_uppercase();
            if !symbol.is_empty() && !wanted.contains(&symbol) {
                wanted.push(symbol);
            }
        }
        if wanted.is_empty() {
            return Err(UpstreamError::Validation(
                "At least one symbol is required".to_string(),
            ));
        }

        let mut sorted = wanted.clone();
        sorted.sort();
        let key = format!("prices:{}", sorted.join(","));

        let wanted = &wanted;
        let cached = self
            .cache
            .get_or_fetch(key, move || async move {
                let outcomes: Vec<Result<PriceQuote>> =
                    join_all(wanted.iter().map(|symbol| self.get_price(symbol))).await;

                let quotes: Vec<PriceQuote> = outcomes
                    .into_iter()
                    .filter_map(|outcome| match outcome {
                        Ok(quote) => Some(quote),
                        Err(e) => {
                            debug!("Dropping symbol from batch: {}", e);
                            None
                        }
                    })
                    .collect();

                serde_json::to_value(&quotes).map_err(|e| {
                    UpstreamError::Transport(format!("Failed to cache prices: {e}"))
                })
            })
            .await?;
        let quotes: Vec<PriceQuote> = decode_as(&cached)?;

        // Cached batches may come from a differently ordered request.
        Ok(wanted
            .iter()
            .filter_map(|symbol| quotes.iter().find(|q| &q.symbol == symbol).cloned())
            .collect())
    }

    #[instrument(name = "BinanceTickerFetch", skip(self), fields(symbol = %symbol))]
    async fn get_24h_ticker(&self, symbol: &str) -> Result<TickerStats> {
        let symbol = normalize_symbol(symbol)?;
        self.fetch_cached(
            format!("ticker24h:{symbol}"),
            "/ticker/24hr",
            &[("symbol", symbol.clone())],
            decode_as::<TickerStats>,
        )
        .await
        .map_err(|e| e.context(&format!("Failed to fetch 24h ticker for {symbol}")))
    }

    #[instrument(name = "BinanceAllTickersFetch", skip(self))]
    async fn get_all_tickers_24h(&self) -> Result<Vec<TickerStats>> {
        self.fetch_cached(
            "all_tickers_24h".to_string(),
            "/ticker/24hr",
            &[],
            decode_tickers,
        )
        .await
        .map_err(|e| e.context("Failed to fetch all tickers"))
    }

    #[instrument(name = "BinanceKlinesFetch", skip(self), fields(symbol = %symbol))]
    async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Vec<Kline>> {
        let symbol = normalize_symbol(symbol)?;
        let limit = limit.clamp(1, MAX_KLINE_LIMIT);

        let mut params = vec![
            ("symbol", symbol.clone()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(start) = start_time {
            params.push(("startTime", start.to_string()));
        }
        if let Some(end) = end_time {
            params.push(("endTime", end.to_string()));
        }

        let key = format!(
            "klines:{symbol}:{interval}:{limit}:{}:{}",
            start_time.map(|t| t.to_string()).unwrap_or_default(),
            end_time.map(|t| t.to_string()).unwrap_or_default()
        );

        self.fetch_cached(key, "/klines", &params, decode_klines)
            .await
            .map_err(|e| e.context(&format!("Failed to fetch klines for {symbol}")))
    }
}
