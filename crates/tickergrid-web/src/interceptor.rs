//! Failure interceptor: the outermost request boundary.
//!
//! Wraps every request. Installs the [`RequestContext`], and turns anything
//! a handler did not classify (escaped failures, panics) into exactly one
//! Problem response: log with the correlation id, classify, serialize.
//! Never retries, never suppresses, never touches request state.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use futures::FutureExt;
use tickergrid_core::Failure;

use crate::classify::classify;
use crate::trace::{RequestContext, TRACE_HEADER};

/// An unclassified failure stashed on a stub response, waiting for this
/// boundary to replace the response body.
#[derive(Debug, Clone)]
pub struct PendingFailure(pub Failure);

/// Middleware wrapping the whole router. Terminal in both directions: a
/// request either completes with the handler's response or is intercepted,
/// and in either case the trace id is echoed back to the caller.
pub async fn intercept(mut request: Request, next: Next) -> Response {
    let ctx = RequestContext::from_headers(request.headers(), request.uri().path());
    request.extensions_mut().insert(ctx.clone());

    let outcome = AssertUnwindSafe(next.run(request)).catch_unwind().await;

    let mut response = match outcome {
        Ok(response) => {
            let pending = response.extensions().get::<PendingFailure>().cloned();
            match pending {
                Some(PendingFailure(failure)) => intercepted(&ctx, &failure),
                None => response,
            }
        }
        Err(panic) => intercepted(&ctx, &Failure::unknown(panic_text(panic.as_ref()))),
    };

    if let Ok(value) = HeaderValue::from_str(ctx.trace_id()) {
        response.headers_mut().insert(TRACE_HEADER, value);
    }

    response
}

fn intercepted(ctx: &RequestContext, failure: &Failure) -> Response {
    tracing::error!(
        trace_id = %ctx.trace_id(),
        path = %ctx.path(),
        code = failure.code(),
        "request failed: {failure}"
    );

    let (problem, status) = classify(failure, ctx);
    (status, Json(problem)).into_response()
}

fn panic_text(panic: &(dyn Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {text}")
    } else if let Some(text) = panic.downcast_ref::<String>() {
        format!("handler panicked: {text}")
    } else {
        String::from("handler panicked")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_are_stringified() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_text(boxed.as_ref()), "handler panicked: boom");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("sliced"));
        assert_eq!(panic_text(boxed.as_ref()), "handler panicked: sliced");

        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_text(boxed.as_ref()), "handler panicked");
    }
}
