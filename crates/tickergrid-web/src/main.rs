use std::sync::Arc;

use tickergrid_web::{app, AppState, InMemoryStore, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let addr = config.listen_addr();
    let state = Arc::new(AppState::new(
        Arc::new(InMemoryStore::with_sample_data()),
        config,
    ));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "tickergrid-web listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
