//! Per-request correlation context.
//!
//! The interceptor installs a [`RequestContext`] as a request extension
//! before any handler runs, so every error constructor can stamp the
//! response with the trace id the caller (or the boundary) assigned.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use uuid::Uuid;

/// Header carrying an externally assigned correlation id.
pub const TRACE_HEADER: &str = "x-trace-id";

const MAX_TRACE_ID_LEN: usize = 64;

/// Correlation identifier plus request path, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    trace_id: String,
    path: String,
}

impl RequestContext {
    /// Build a context from an inbound header map, minting a fresh id when
    /// the caller did not supply a usable one.
    pub fn from_headers(headers: &HeaderMap, path: &str) -> Self {
        let inbound = headers
            .get(TRACE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| is_usable_trace_id(id));

        let trace_id = match inbound {
            Some(id) => id.to_owned(),
            None => Uuid::new_v4().simple().to_string(),
        };

        Self {
            trace_id,
            path: path.to_owned(),
        }
    }

    /// Context with an explicit trace id; falls back to a minted id if the
    /// given one is unusable.
    pub fn new(trace_id: impl Into<String>, path: impl Into<String>) -> Self {
        let trace_id = trace_id.into();
        let trace_id = if is_usable_trace_id(trace_id.trim()) {
            trace_id.trim().to_owned()
        } else {
            Uuid::new_v4().simple().to_string()
        };

        Self {
            trace_id,
            path: path.into(),
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_usable_trace_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_TRACE_ID_LEN && id.chars().all(|ch| ch.is_ascii_graphic())
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Installed by the interceptor; the fallback covers handlers tested
        // without the boundary layer.
        let ctx = parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(|| RequestContext::from_headers(&parts.headers, parts.uri.path()));
        Ok(ctx)
    }
}
