pub mod binance;
pub mod util;

pub use binance::BinanceClient;
