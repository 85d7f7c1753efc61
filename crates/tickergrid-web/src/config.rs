//! Server configuration from environment variables.

use std::env;
use std::time::Duration;

/// Runtime settings for the HTTP tier.
///
/// Values are read from `TICKERGRID_*` environment variables with sensible
/// defaults, so a bare `tickergrid-web` invocation serves on localhost.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind, default `127.0.0.1`.
    pub bind_addr: String,
    /// TCP port, default `8480`.
    pub port: u16,
    /// Per-request time budget for storage calls.
    pub request_budget: Duration,
    /// Shared secret required for mutating requests. `None` disables the
    /// check (local development).
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::from("127.0.0.1"),
            port: 8480,
            request_budget: Duration::from_secs(5),
            api_key: None,
        }
    }
}

impl ServerConfig {
    /// Build a config from the process environment.
    ///
    /// | Variable | Meaning | Default |
    /// |----------|---------|---------|
    /// | `TICKERGRID_BIND` | bind interface | `127.0.0.1` |
    /// | `TICKERGRID_PORT` | TCP port | `8480` |
    /// | `TICKERGRID_REQUEST_BUDGET_MS` | storage time budget | `5000` |
    /// | `TICKERGRID_API_KEY` | mutation shared secret | unset |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = env::var("TICKERGRID_BIND").unwrap_or(defaults.bind_addr);
        let port = env::var("TICKERGRID_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.port);
        let request_budget = env::var("TICKERGRID_REQUEST_BUDGET_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_budget);
        let api_key = env::var("TICKERGRID_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Self {
            bind_addr,
            port,
            request_budget,
            api_key,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
