//! Derives conversion rates between currencies from USDT-quoted prices.
//!
//! The exchange only prices assets against USDT, so every cross rate is
//! synthesized through that common denominator. USD is treated as USDT.

use crate::core::currency::CurrencyRateProvider;
use crate::core::error::{Result, UpstreamError};
use crate::core::market::MarketDataProvider;
use crate::core::symbols::{STABLE_PAIR, is_fiat, is_usd_like, symbol_for};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct RateResolver {
    market: Arc<dyn MarketDataProvider>,
}

impl RateResolver {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self { market }
    }

    fn resolve(currency: &str) -> Result<&'static str> {
        symbol_for(currency).ok_or_else(|| {
            if is_fiat(currency) {
                UpstreamError::Validation(format!("Unsupported fiat currency: {currency}"))
            } else {
                UpstreamError::Validation(format!("Unsupported currency: {currency}"))
            }
        })
    }

    async fn usdt_price(&self, symbol: &str) -> Result<f64> {
        Ok(self.market.get_price(symbol).await?.price)
    }

    /// USDT worth one unit of `symbol`, inverted: units of `symbol` per USDT.
    async fn inverse_price(&self, symbol: &str, currency: &str) -> Result<f64> {
        let price = self.usdt_price(symbol).await?;
        if price == 0.0 {
            return Err(UpstreamError::Validation(format!(
                "Rate for {currency} is zero"
            )));
        }
        Ok(1.0 / price)
    }
}

#[async_trait]
impl CurrencyRateProvider for RateResolver {
    #[instrument(name = "ResolveRate", skip(self))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(1.0);
        }

        if is_usd_like(from) {
            if is_usd_like(to) {
                return Ok(1.0);
            }
            let to_symbol = Self::resolve(to)?;
            if to_symbol == STABLE_PAIR {
                return Ok(1.0);
            }
            return self.inverse_price(to_symbol, to).await;
        }

        if is_usd_like(to) {
            let from_symbol = Self::resolve(from)?;
            if from_symbol == STABLE_PAIR {
                return Ok(1.0);
            }
            return self.usdt_price(from_symbol).await;
        }

        let from_symbol = Self::resolve(from)?;
        let to_symbol = Self::resolve(to)?;

        match (from_symbol == STABLE_PAIR, to_symbol == STABLE_PAIR) {
            (true, true) => Ok(1.0),
            (true, false) => self.inverse_price(to_symbol, to).await,
            (false, true) => self.usdt_price(from_symbol).await,
            (false, false) => {
                let from_usdt = self.usdt_price(from_symbol).await?;
                let to_usdt = self.usdt_price(to_symbol).await?;
                if to_usdt == 0.0 {
                    return Err(UpstreamError::Validation(format!(
                        "Rate for {to} is zero"
                    )));
                }
                debug!(from_usdt, to_usdt, "Computed cross rate via USDT");
                Ok(from_usdt / to_usdt)
            }
        }
    }
}
