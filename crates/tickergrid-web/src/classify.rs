//! Classification of unexpected failures into the wire contract.
//!
//! This is a pure table over [`FailureKind`], first match wins, `Unknown`
//! as the default arm. Unknown failures never put their internal message on
//! the wire; the interceptor has already logged it.

use axum::http::StatusCode;
use tickergrid_core::{Failure, FailureKind, Problem};

use crate::trace::RequestContext;

/// Detail used for every 500-class response. The raw failure text stays in
/// the logs.
pub const GENERIC_INTERNAL_DETAIL: &str =
    "An unexpected error occurred while processing the request";

/// Map an internal failure to the Problem and status it crosses the wire
/// as. Pure: reads only the failure's kind and message.
pub fn classify(failure: &Failure, ctx: &RequestContext) -> (Problem, StatusCode) {
    let (status, detail) = match failure.kind() {
        FailureKind::InvalidArgument => (400, failure.message().to_owned()),
        FailureKind::NotFound => (404, failure.message().to_owned()),
        FailureKind::Unauthorized => (401, failure.message().to_owned()),
        FailureKind::Timeout => (408, failure.message().to_owned()),
        FailureKind::Unknown => (500, String::from(GENERIC_INTERNAL_DETAIL)),
    };

    let problem = Problem::new(status, detail, ctx.path(), ctx.trace_id())
        .expect("table statuses are supported and context trace ids are non-empty");
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (problem, status)
}
