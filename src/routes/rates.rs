use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use super::AppState;
use super::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/rate/:from/:to", get(rate))
}

/// GET /api/v1/rate/{from}/{to} — units of `to` per one `from`, as a bare number.
async fn rate(
    State(state): State<Arc<AppState>>,
    Path((from, to)): Path<(String, String)>,
) -> Result<Json<f64>, ApiError> {
    Ok(Json(state.rates.get_rate(&from, &to).await?))
}
