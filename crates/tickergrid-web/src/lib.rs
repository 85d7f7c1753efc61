//! # Tickergrid Web
//!
//! HTTP tier for the tickergrid market-data service.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Resource handlers (exchanges, sectors, stocks, prices) |
//! | [`classify`] | Failure-kind to Problem/status classification |
//! | [`config`] | Environment-driven server configuration |
//! | [`error`] | Response helpers for expected failure conditions |
//! | [`guards`] | Composable request precondition checks |
//! | [`interceptor`] | Boundary middleware for unclassified failures |
//! | [`store`] | Storage collaborator trait and in-memory impl |
//! | [`trace`] | Per-request correlation context |
//!
//! ## Error Flow
//!
//! A handler either returns an [`error::ApiError`] built by a response
//! helper (expected failures: validation, misses, conflicts, rule
//! violations) or propagates a [`tickergrid_core::Failure`] with `?`. The
//! [`interceptor`] catches whatever was not classified, logs it with the
//! request's trace id, and serializes exactly one Problem response. Every
//! error status this tier emits is in
//! [`tickergrid_core::SUPPORTED_STATUSES`].

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod guards;
pub mod interceptor;
pub mod store;
pub mod trace;

use std::sync::Arc;

use axum::middleware;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use classify::{classify, GENERIC_INTERNAL_DETAIL};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, RouteError};
pub use store::{InMemoryStore, MarketStore, StorageError, StoreFuture};
pub use trace::{RequestContext, TRACE_HEADER};

/// Shared state handed to every handler.
pub struct AppState {
    pub store: Arc<dyn MarketStore>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketStore>, config: ServerConfig) -> Self {
        Self { store, config }
    }
}

/// Assemble the full router with the failure interceptor as the outermost
/// application layer, so no request can complete without passing through
/// the boundary.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(api::router())
        .fallback(unknown_route)
        .layer(middleware::from_fn(interceptor::intercept))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Unknown routes speak the same contract as everything else.
async fn unknown_route(ctx: RequestContext) -> ApiError {
    ApiError::not_found(&ctx, format!("no route matches '{}'", ctx.path()))
}
