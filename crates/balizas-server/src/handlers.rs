//! HTTP handlers exposing the beacon cache.
//!
//! Every read of the beacon endpoint triggers a refresh cycle; the cache
//! itself decides what the caller gets back.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use balizas_core::{BeaconCache, FeedSource, Snapshot};
use serde_json::json;
use tracing::error;

/// Route the map front-end polls for beacon data
pub(crate) const BEACONS_ROUTE: &str = "/api/v1/balizasV16";

pub(crate) fn router<S>(cache: Arc<BeaconCache<S>>) -> Router
where
    S: FeedSource + 'static,
{
    Router::new()
        .route(BEACONS_ROUTE, get(get_beacons::<S>))
        .route("/health", get(health_check))
        .with_state(cache)
}

/// Error type that implements IntoResponse
pub(crate) struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request error: {:#}", self.error);
        (
            self.status,
            Json(json!({
                "detail": self.error.to_string(),
            })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.into(),
        }
    }
}

/// GET /api/v1/balizasV16 - refresh and return the beacon snapshot
async fn get_beacons<S: FeedSource>(
    State(cache): State<Arc<BeaconCache<S>>>,
) -> Result<Json<Arc<Snapshot>>, AppError> {
    Ok(Json(cache.refresh().await?))
}

/// GET /health - Basic health check
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "healthy"})))
}
