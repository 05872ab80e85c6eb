//! Market overview ranking of the popular symbols.

use crate::core::market::TickerStats;
use crate::core::symbols::{base_asset, display_name, is_popular};
use serde::Serialize;

/// Entries returned by the overview.
pub const OVERVIEW_SIZE: usize = 10;

/// One coin in the overview, shaped like a CoinGecko markets entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,
    pub current_price: f64,
    pub price_change_percentage_24h: f64,
    /// Quote volume stands in for market cap, which the exchange does not report.
    pub market_cap: f64,
    pub total_volume: f64,
}

impl MarketCoin {
    fn from_ticker(ticker: &TickerStats) -> Self {
        let base = base_asset(&ticker.symbol).to_lowercase();
        MarketCoin {
            id: base.clone(),
            image: format!("https://assets.coingecko.com/coins/images/1/large/{base}.png"),
            symbol: base,
            name: display_name(&ticker.symbol),
            current_price: ticker.last_price,
            price_change_percentage_24h: ticker.price_change_percent,
            market_cap: ticker.quote_volume,
            total_volume: ticker.volume,
        }
    }
}

/// Keeps the popular symbols, ranked by 24h quote volume, highest first.
pub fn market_overview(tickers: &[TickerStats]) -> Vec<MarketCoin> {
    let mut popular: Vec<&TickerStats> = tickers.iter().filter(|t| is_popular(&t.symbol)).collect();
    popular.sort_by(|a, b| b.quote_volume.total_cmp(&a.quote_volume));
    popular
        .into_iter()
        .take(OVERVIEW_SIZE)
        .map(MarketCoin::from_ticker)
        .collect()
}
