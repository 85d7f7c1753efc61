use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tickergrid_core::Sector;

use crate::error::ApiResult;
use crate::AppState;

async fn list_sectors(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Sector>>> {
    let sectors = state.store.sectors().await?;
    Ok(Json(sectors))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/sectors", get(list_sectors))
}
