//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod market;
pub mod overview;
pub mod rates;
pub mod symbols;

// Re-export main types for cleaner imports
pub use currency::CurrencyRateProvider;
pub use error::UpstreamError;
pub use market::{Kline, MarketDataProvider, PriceQuote, TickerStats};
pub use overview::{MarketCoin, market_overview};
pub use rates::RateResolver;
