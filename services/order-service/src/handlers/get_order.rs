use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::metrics;
use domain::Order;
use storage::StoreError;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Cache-aside order lookup: serve from the cache when resident, otherwise
/// load from the store under the HTTP timeout budget and fill the cache
/// before returning.
pub async fn get_order_handler(
    State(state): State<AppState>,
    Path(order_uid): Path<String>,
) -> Result<Json<Order>, (StatusCode, String)> {
    metrics::HTTP_REQUESTS_TOTAL.inc();
    let timer = metrics::HTTP_DURATION.start_timer();
    let result = lookup(&state, &order_uid).await;
    timer.observe_duration();

    if result.is_err() {
        metrics::HTTP_ERRORS_TOTAL.inc();
    }
    result
}

async fn lookup(state: &AppState, order_uid: &str) -> Result<Json<Order>, (StatusCode, String)> {
    if let Some(order) = state.cache.get(order_uid) {
        debug!(order_uid, "cache hit");
        return Ok(Json(order));
    }

    debug!(order_uid, "cache miss, querying store");

    match timeout(state.http_timeout, state.store.load(order_uid)).await {
        Ok(Ok(order)) => {
            state.cache.set(order_uid, order.clone());
            info!(order_uid, "order served from store");
            Ok(Json(order))
        }
        Ok(Err(StoreError::NotFound(_))) => {
            info!(order_uid, "order not found");
            Err((
                StatusCode::NOT_FOUND,
                format!("order not found: {order_uid}"),
            ))
        }
        Ok(Err(e)) => {
            error!(order_uid, error = %e, "failed to load order");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to load order: {e}"),
            ))
        }
        Err(_) => {
            error!(order_uid, "store lookup exceeded request budget");
            Err((
                StatusCode::GATEWAY_TIMEOUT,
                "store lookup timed out".to_string(),
            ))
        }
    }
}
