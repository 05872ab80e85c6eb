//! HTTP surface over the market data and rate providers.

pub mod error;
pub mod klines;
pub mod market;
pub mod prices;
pub mod rates;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::{CurrencyRateProvider, MarketDataProvider};

/// Shared application state, passed to all route handlers via `axum::extract::State`.
pub struct AppState {
    pub market: Arc<dyn MarketDataProvider>,
    pub rates: Arc<dyn CurrencyRateProvider>,
}

impl AppState {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        rates: Arc<dyn CurrencyRateProvider>,
    ) -> Arc<Self> {
        Arc::new(Self { market, rates })
    }
}

/// Assemble the API router.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(prices::routes())
        .merge(rates::routes())
        .merge(market::routes())
        .merge(klines::routes())
}

/// Full application: service routes, `/api/v1`, CORS and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "coinrelay - Binance market data proxy" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
