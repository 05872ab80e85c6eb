//! Terminal rendering for one-shot lookups.

pub mod setup;
pub mod ui;

use crate::core::{MarketCoin, PriceQuote};
use comfy_table::Cell;

/// Decimal places worth showing for a price of this magnitude.
fn price_precision(price: f64) -> usize {
    match price.abs() {
        p if p >= 1.0 => 2,
        p if p >= 0.01 => 4,
        _ => 8,
    }
}

pub fn prices_table(quotes: &[PriceQuote]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Symbol"), ui::header_cell("Price")]);
    for quote in quotes {
        table.add_row(vec![
            Cell::new(&quote.symbol),
            ui::number_cell(quote.price, price_precision(quote.price)),
        ]);
    }
    table.to_string()
}

pub fn market_table(coins: &[MarketCoin]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Coin"),
        ui::header_cell("Price (USDT)"),
        ui::header_cell("24h"),
        ui::header_cell("Volume (USDT)"),
    ]);
    for (rank, coin) in coins.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(format!("{} ({})", coin.name, coin.symbol.to_uppercase())),
            ui::number_cell(coin.current_price, price_precision(coin.current_price)),
            ui::change_cell(coin.price_change_percentage_24h),
            ui::number_cell(coin.market_cap, 0),
        ]);
    }
    table.to_string()
}

pub fn rate_line(from: &str, to: &str, rate: f64) -> String {
    format!(
        "1 {} = {} {}",
        from.to_uppercase(),
        ui::style_text(&format!("{rate:.8}"), ui::StyleType::Value),
        to.to_uppercase()
    )
}

/// Names the requested symbols the batch came back without, if any.
pub fn missing_symbols_line(requested: &[String], quotes: &[PriceQuote]) -> Option<String> {
    let mut missing: Vec<String> = Vec::new();
    for symbol in requested {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty()
            && !missing.contains(&symbol)
            && !quotes.iter().any(|q| q.symbol == symbol)
        {
            missing.push(symbol);
        }
    }
    if missing.is_empty() {
        return None;
    }
    Some(ui::style_text(
        &format!("No price for: {}", missing.join(", ")),
        ui::StyleType::Error,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_precision_by_magnitude() {
        assert_eq!(price_precision(50000.0), 2);
        assert_eq!(price_precision(0.4412), 4);
        assert_eq!(price_precision(0.00001234), 8);
    }

    #[test]
    fn test_prices_table_lists_every_quote() {
        let table = prices_table(&[
            PriceQuote {
                symbol: "BTCUSDT".to_string(),
                price: 50000.0,
            },
            PriceQuote {
                symbol: "ADAUSDT".to_string(),
                price: 0.4412,
            },
        ]);
        assert!(table.contains("BTCUSDT"));
        assert!(table.contains("50000.00"));
        assert!(table.contains("0.4412"));
    }

    #[test]
    fn test_rate_line_mentions_both_currencies() {
        let line = console::strip_ansi_codes(&rate_line("eth", "btc", 0.05)).to_string();
        assert_eq!(line, "1 ETH = 0.05000000 BTC");
    }

    #[test]
    fn test_missing_symbols_line_names_dropped_symbols() {
        let quotes = vec![PriceQuote {
            symbol: "BTCUSDT".to_string(),
            price: 50000.0,
        }];
        let requested = vec![
            "btcusdt".to_string(),
            "nopeusdt".to_string(),
            "NOPEUSDT".to_string(),
        ];

        let line = missing_symbols_line(&requested, &quotes).unwrap();
        assert!(line.contains("No price for: NOPEUSDT"));
        assert!(!line.contains("BTCUSDT"));

        assert!(missing_symbols_line(&requested[..1], &quotes).is_none());
    }
}
