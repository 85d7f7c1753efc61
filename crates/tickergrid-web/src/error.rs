//! Response helpers for expected failure conditions.
//!
//! Handlers that can anticipate a failure (validation, lookup miss,
//! conflict, rule violation) build an [`ApiError`] directly and never
//! involve the interceptor. Every constructor pins the status code for its
//! category, so a given category always serializes the same way.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tickergrid_core::{Failure, FieldViolation, Problem, ResourceClass};

use crate::interceptor::PendingFailure;
use crate::store::StorageError;
use crate::trace::RequestContext;

/// A classified error response, ready to serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    problem: Problem,
}

impl ApiError {
    fn build(ctx: &RequestContext, status: u16, detail: String) -> Self {
        let problem = Problem::new(status, detail, ctx.path(), ctx.trace_id())
            .expect("helper statuses are supported and context trace ids are non-empty");
        Self { problem }
    }

    pub fn bad_request(ctx: &RequestContext, detail: impl Into<String>) -> Self {
        Self::build(ctx, 400, detail.into())
    }

    pub fn unauthorized(ctx: &RequestContext, detail: impl Into<String>) -> Self {
        Self::build(ctx, 401, detail.into())
    }

    pub fn forbidden(ctx: &RequestContext, detail: impl Into<String>) -> Self {
        Self::build(ctx, 403, detail.into())
    }

    pub fn not_found(ctx: &RequestContext, detail: impl Into<String>) -> Self {
        Self::build(ctx, 404, detail.into())
    }

    /// 404 with a deterministic, testable detail message.
    pub fn resource_not_found(
        ctx: &RequestContext,
        class: ResourceClass,
        id: impl AsRef<str>,
    ) -> Self {
        Self::build(
            ctx,
            404,
            format!(
                "{} with identifier '{}' was not found",
                class.label(),
                id.as_ref()
            ),
        )
    }

    pub fn conflict(ctx: &RequestContext, detail: impl Into<String>) -> Self {
        Self::build(ctx, 409, detail.into())
    }

    /// 409 with a deterministic, testable detail message.
    pub fn resource_conflict(
        ctx: &RequestContext,
        class: ResourceClass,
        id: impl AsRef<str>,
    ) -> Self {
        Self::build(
            ctx,
            409,
            format!(
                "{} with identifier '{}' already exists",
                class.label(),
                id.as_ref()
            ),
        )
    }

    /// 422: the request is well-formed but violates a domain rule.
    pub fn business_rule(ctx: &RequestContext, detail: impl Into<String>) -> Self {
        Self::build(ctx, 422, detail.into())
    }

    /// 400 carrying one entry per violated field.
    pub fn validation(ctx: &RequestContext, violations: Vec<FieldViolation>) -> Self {
        let mut error = Self::build(ctx, 400, String::from("One or more fields are invalid"));
        error.problem = error.problem.with_violations(violations);
        error
    }

    /// 400 from a plain message, normalized into the same `errors` shape as
    /// the structured variant.
    pub fn validation_message(ctx: &RequestContext, message: impl Into<String>) -> Self {
        let violation = FieldViolation::new("request", message)
            .expect("literal field name is non-empty");
        Self::validation(ctx, vec![violation])
    }

    pub fn invalid_parameter(
        ctx: &RequestContext,
        name: &str,
        detail: impl Into<String>,
    ) -> Self {
        Self::build(
            ctx,
            400,
            format!("parameter '{}' is invalid: {}", name, detail.into()),
        )
    }

    pub fn required_parameter(ctx: &RequestContext, name: &str) -> Self {
        Self::build(ctx, 400, format!("required parameter '{name}' is missing"))
    }

    pub fn internal(ctx: &RequestContext, detail: impl Into<String>) -> Self {
        Self::build(ctx, 500, detail.into())
    }

    pub fn from_problem(problem: Problem) -> Self {
        Self { problem }
    }

    pub fn status(&self) -> u16 {
        self.problem.status
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn into_problem(self) -> Problem {
        self.problem
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.problem.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.problem)).into_response()
    }
}

/// What a handler can return on the error path: a response already shaped
/// by the helpers above, or an unclassified failure for the interceptor.
#[derive(Debug)]
pub enum RouteError {
    Response(ApiError),
    Failure(Failure),
}

pub type ApiResult<T> = Result<T, RouteError>;

impl From<ApiError> for RouteError {
    fn from(error: ApiError) -> Self {
        Self::Response(error)
    }
}

impl From<Failure> for RouteError {
    fn from(failure: Failure) -> Self {
        Self::Failure(failure)
    }
}

impl From<StorageError> for RouteError {
    fn from(error: StorageError) -> Self {
        Self::Failure(error.into())
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        match self {
            Self::Response(error) => error.into_response(),
            // The interceptor replaces this stub with a classified Problem;
            // the failure rides along as a response extension.
            Self::Failure(failure) => {
                let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
                response.extensions_mut().insert(PendingFailure(failure));
                response
            }
        }
    }
}
