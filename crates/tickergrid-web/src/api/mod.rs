//! Resource handlers, one module per resource class.

pub mod exchanges;
pub mod sectors;
pub mod stocks;

use std::sync::Arc;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(exchanges::router())
        .merge(sectors::router())
        .merge(stocks::router())
}
