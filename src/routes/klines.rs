use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use super::AppState;
use super::error::ApiError;
use crate::core::Kline;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/klines/:symbol", get(klines))
}

#[derive(Debug, Deserialize)]
struct KlinesQuery {
    #[serde(default = "default_interval")]
    interval: String,
    #[serde(default = "default_limit")]
    limit: u32,
    /// Milliseconds since the epoch.
    start_time: Option<i64>,
    end_time: Option<i64>,
}

fn default_interval() -> String {
    "1h".to_string()
}

fn default_limit() -> u32 {
    100
}

/// GET /api/v1/klines/{symbol}?interval=1h&limit=100&start_time=..&end_time=..
async fn klines(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<KlinesQuery>,
) -> Result<Json<Vec<Kline>>, ApiError> {
    let klines = state
        .market
        .get_klines(
            &symbol,
            &query.interval,
            query.limit,
            query.start_time,
            query.end_time,
        )
        .await?;
    Ok(Json(klines))
}
