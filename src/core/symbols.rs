//! Currency name to exchange symbol mapping

/// USDT priced against itself; always converts 1:1.
pub const STABLE_PAIR: &str = "USDTUSDT";

const QUOTE_ASSET: &str = "USDT";

/// Symbols shown in the market overview.
pub const POPULAR_SYMBOLS: &[&str] = &[
    "BTCUSDT",
    "ETHUSDT",
    "BNBUSDT",
    "SOLUSDT",
    "XRPUSDT",
    "ADAUSDT",
    "DOGEUSDT",
    "DOTUSDT",
    "MATICUSDT",
    "AVAXUSDT",
];

const FIAT_CURRENCIES: &[&str] = &["usd", "inr"];

/// Maps a currency name or code to its USDT trading pair.
///
/// Lookup is case-insensitive. Fiat codes other than `usd` have no pair.
pub fn symbol_for(currency: &str) -> Option<&'static str> {
    match currency.to_lowercase().as_str() {
        "bitcoin" | "btc" => Some("BTCUSDT"),
        "ethereum" | "eth" => Some("ETHUSDT"),
        "tether" | "usdt" | "usd" => Some(STABLE_PAIR),
        "cardano" | "ada" => Some("ADAUSDT"),
        "bnb" => Some("BNBUSDT"),
        "solana" | "sol" => Some("SOLUSDT"),
        "xrp" | "ripple" => Some("XRPUSDT"),
        "polkadot" | "dot" => Some("DOTUSDT"),
        "dogecoin" | "doge" => Some("DOGEUSDT"),
        "matic" | "polygon" => Some("MATICUSDT"),
        _ => None,
    }
}

/// Human readable name for a trading pair.
pub fn display_name(symbol: &str) -> String {
    let name = match symbol {
        "BTCUSDT" => "Bitcoin",
        "ETHUSDT" => "Ethereum",
        STABLE_PAIR => "Tether",
        "ADAUSDT" => "Cardano",
        "BNBUSDT" => "BNB",
        "SOLUSDT" => "Solana",
        "XRPUSDT" => "Ripple",
        "DOTUSDT" => "Polkadot",
        "DOGEUSDT" => "Dogecoin",
        "MATICUSDT" => "Polygon",
        _ => return base_asset(symbol).to_string(),
    };
    name.to_string()
}

/// Strips the quote asset, e.g. `BTCUSDT` becomes `BTC`.
pub fn base_asset(symbol: &str) -> &str {
    symbol.strip_suffix(QUOTE_ASSET).unwrap_or(symbol)
}

pub fn is_popular(symbol: &str) -> bool {
    POPULAR_SYMBOLS.contains(&symbol)
}

pub fn is_fiat(currency: &str) -> bool {
    FIAT_CURRENCIES.contains(&currency.to_lowercase().as_str())
}

/// USD and USDT are interchangeable for pricing.
pub fn is_usd_like(currency: &str) -> bool {
    matches!(currency.to_lowercase().as_str(), "usd" | "usdt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_lookup_is_case_insensitive() {
        assert_eq!(symbol_for("Bitcoin"), Some("BTCUSDT"));
        assert_eq!(symbol_for("ETH"), Some("ETHUSDT"));
        assert_eq!(symbol_for("polygon"), Some("MATICUSDT"));
        assert_eq!(symbol_for("USD"), Some(STABLE_PAIR));
        assert_eq!(symbol_for("inr"), None);
        assert_eq!(symbol_for("xyz_unknown"), None);
    }

    #[test]
    fn test_display_name_falls_back_to_base_asset() {
        assert_eq!(display_name("BTCUSDT"), "Bitcoin");
        assert_eq!(display_name("AVAXUSDT"), "AVAX");
        assert_eq!(display_name("BTCEUR"), "BTCEUR");
    }

    #[test]
    fn test_currency_classes() {
        assert!(is_fiat("INR"));
        assert!(is_fiat("usd"));
        assert!(!is_fiat("usdt"));
        assert!(is_usd_like("USDT"));
        assert!(!is_usd_like("inr"));
        assert!(is_popular("AVAXUSDT"));
        assert!(!is_popular("PEPEUSDT"));
    }
}
