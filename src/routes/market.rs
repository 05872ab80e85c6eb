use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use super::AppState;
use super::error::ApiError;
use crate::core::{MarketCoin, market_overview};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/market-data", get(market_data))
}

/// GET /api/v1/market-data — top popular coins by 24h quote volume.
async fn market_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MarketCoin>>, ApiError> {
    let tickers = state.market.get_all_tickers_24h().await?;
    Ok(Json(market_overview(&tickers)))
}
