// Shared helpers for the behavior test suites.

use std::sync::Arc;

pub use tickergrid_core::{Failure, Problem, ResourceClass, Symbol};
pub use tickergrid_web::{app, AppState, InMemoryStore, ServerConfig};

/// Router over the sample data set with default config.
pub fn sample_app() -> axum::Router {
    sample_app_with(ServerConfig::default())
}

/// Router over the sample data set with a custom config.
pub fn sample_app_with(config: ServerConfig) -> axum::Router {
    app(Arc::new(AppState::new(
        Arc::new(InMemoryStore::with_sample_data()),
        config,
    )))
}
