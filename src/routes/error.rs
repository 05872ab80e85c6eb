use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::warn;

use crate::core::UpstreamError;

/// Maps upstream failures onto HTTP responses.
///
/// Validation problems are the caller's fault (400); everything else is
/// reported as a server error (500). The message is preserved either way.
#[derive(Debug)]
pub struct ApiError(pub UpstreamError);

impl From<UpstreamError> for ApiError {
    fn from(e: UpstreamError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            UpstreamError::Validation(_) => StatusCode::BAD_REQUEST,
            other => {
                warn!(error = %other, "Upstream request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = json!({ "detail": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}
