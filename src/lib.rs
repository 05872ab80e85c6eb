pub mod cli;
pub mod core;
pub mod providers;
pub mod routes;

use crate::cli::ui;
use crate::core::cache::TtlCache;
use crate::core::config::AppConfig;
use crate::core::{CurrencyRateProvider, MarketDataProvider, RateResolver, market_overview};
use crate::providers::BinanceClient;
use crate::routes::AppState;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Serve,
    Price { symbols: Vec<String> },
    Rate { from: String, to: String },
    Market,
}

/// Wires the cached upstream client and the rate resolver around one shared cache.
pub fn build_state(config: &AppConfig) -> Result<Arc<AppState>> {
    let cache = TtlCache::new(config.upstream.cache_ttl());
    let client: Arc<dyn MarketDataProvider> =
        Arc::new(BinanceClient::new(&config.upstream, cache)?);
    let rates: Arc<dyn CurrencyRateProvider> = Arc::new(RateResolver::new(Arc::clone(&client)));
    Ok(AppState::new(client, rates))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let state = build_state(&config)?;

    match command {
        AppCommand::Serve => serve(&config, state).await,
        AppCommand::Price { symbols } => {
            let spinner = ui::new_spinner("Fetching prices...");
            let quotes = state.market.get_prices(&symbols).await;
            spinner.finish_and_clear();
            let quotes = quotes?;
            if quotes.is_empty() {
                println!(
                    "{}",
                    ui::style_text("No prices available for the given symbols", ui::StyleType::Subtle)
                );
            } else {
                println!("{}", cli::prices_table(&quotes));
            }
            if let Some(line) = cli::missing_symbols_line(&symbols, &quotes) {
                println!("{line}");
            }
            Ok(())
        }
        AppCommand::Rate { from, to } => {
            let rate = state.rates.get_rate(&from, &to).await?;
            println!("{}", cli::rate_line(&from, &to, rate));
            Ok(())
        }
        AppCommand::Market => {
            let spinner = ui::new_spinner("Fetching 24h tickers...");
            let tickers = state.market.get_all_tickers_24h().await;
            spinner.finish_and_clear();
            let coins = market_overview(&tickers?);
            println!("{}", ui::style_text("Market overview", ui::StyleType::Title));
            println!("{}", cli::market_table(&coins));
            Ok(())
        }
    }
}

/// Serves the HTTP API until Ctrl+C.
pub async fn serve(config: &AppConfig, state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address: {}:{}",
                config.server.bind, config.server.port
            )
        })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("coinrelay listening on http://{addr}");

    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, gracefully stopping");
}
