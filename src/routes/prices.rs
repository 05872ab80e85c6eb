use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use super::AppState;
use super::error::ApiError;
use crate::core::{PriceQuote, TickerStats};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/price/:symbol", get(price))
        .route("/prices", get(prices))
        .route("/ticker/:symbol", get(ticker))
}

#[derive(Debug, Deserialize)]
struct PricesQuery {
    /// Comma-separated symbols, e.g. `BTCUSDT,ETHUSDT`.
    symbols: String,
}

/// GET /api/v1/price/{symbol}
async fn price(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<PriceQuote>, ApiError> {
    Ok(Json(state.market.get_price(&symbol).await?))
}

/// GET /api/v1/prices?symbols=A,B — best effort, failed symbols are omitted.
async fn prices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<Vec<PriceQuote>>, ApiError> {
    let symbols: Vec<String> = query.symbols.split(',').map(str::to_string).collect();
    Ok(Json(state.market.get_prices(&symbols).await?))
}

/// GET /api/v1/ticker/{symbol}
async fn ticker(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<TickerStats>, ApiError> {
    Ok(Json(state.market.get_24h_ticker(&symbol).await?))
}
