use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tickergrid_core::Exchange;

use crate::error::ApiResult;
use crate::AppState;

async fn list_exchanges(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Exchange>>> {
    let exchanges = state.store.exchanges().await?;
    Ok(Json(exchanges))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/exchanges", get(list_exchanges))
}
