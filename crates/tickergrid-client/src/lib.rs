//! # Tickergrid Client
//!
//! Caching, retrying client for the tickergrid market-data API.
//!
//! ## Overview
//!
//! - **Typed surface** ([`MarketClient`]) over exchanges, sectors, stocks
//!   and price series
//! - **Retry policy** ([`RetryPolicy`]) with capped exponential backoff,
//!   gated on the server's error contract
//! - **Keyed cache** ([`CacheCoordinator`]) with hierarchical keys,
//!   stale-while-revalidate reads and linked invalidation groups
//! - **Cooperative cancellation** ([`RequestToken`]): no pending retry
//!   fires and no cache write lands after a cancel
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Cache coordinator, keys, staleness windows |
//! | [`client`] | Typed client and request loop |
//! | [`error`] | Client error taxonomy |
//! | [`outcome`] | Per-request outcome variants |
//! | [`retry`] | Retry policy and backoff |
//! | [`token`] | Cancellation tokens |
//! | [`transport`] | HTTP transport trait and implementations |
//!
//! ## Error Handling
//!
//! Every failure collapses into an [`ApiClientError`] whose
//! [`ErrorCategory`] decides retries and surfacing:
//!
//! ```rust
//! use tickergrid_client::{ApiClientError, ErrorCategory};
//!
//! fn describe(error: &ApiClientError) -> &'static str {
//!     match error.category() {
//!         ErrorCategory::Auth => "sign in again",
//!         ErrorCategory::NotFound => "resource missing",
//!         ErrorCategory::Transient => "retried automatically",
//!         _ => "request rejected",
//!     }
//! }
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod outcome;
pub mod retry;
pub mod token;
pub mod transport;

// Re-export commonly used types at crate root for convenience

pub use cache::{CacheConfig, CacheCoordinator, CacheHit, CacheKey, CacheMode};
pub use client::{MarketClient, MarketClientBuilder, StockUpdate};
pub use error::{ApiClientError, ErrorCategory};
pub use outcome::RequestOutcome;
pub use retry::{RequestKind, RetryPolicy};
pub use token::RequestToken;
pub use transport::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};
