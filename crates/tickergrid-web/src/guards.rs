//! Composable request guards.
//!
//! Each guard checks one precondition and returns `Some(ApiError)` on
//! violation, `None` otherwise. Handlers run a sequence of guards through
//! [`first_of`] and return on the first hit, which keeps the checks flat
//! instead of nested.

use time::OffsetDateTime;

use crate::error::ApiError;
use crate::trace::RequestContext;

/// First-violation-wins composition over a guard sequence.
pub fn first_of(checks: impl IntoIterator<Item = Option<ApiError>>) -> Option<ApiError> {
    checks.into_iter().flatten().next()
}

/// The parameter must be present and non-blank.
pub fn require_string(ctx: &RequestContext, name: &str, value: Option<&str>) -> Option<ApiError> {
    match value {
        None => Some(ApiError::required_parameter(ctx, name)),
        Some(raw) if raw.trim().is_empty() => Some(ApiError::required_parameter(ctx, name)),
        Some(_) => None,
    }
}

/// The value must be present.
pub fn require_present<T>(ctx: &RequestContext, name: &str, value: Option<&T>) -> Option<ApiError> {
    if value.is_none() {
        return Some(ApiError::required_parameter(ctx, name));
    }
    None
}

/// `from` must not exceed `to`.
pub fn require_date_range(
    ctx: &RequestContext,
    from: OffsetDateTime,
    to: OffsetDateTime,
) -> Option<ApiError> {
    if from > to {
        return Some(ApiError::invalid_parameter(
            ctx,
            "from",
            "range start must not exceed range end",
        ));
    }
    None
}

/// The value must lie inside the inclusive `[min, max]` interval.
pub fn require_in_range(
    ctx: &RequestContext,
    name: &str,
    value: i64,
    min: i64,
    max: i64,
) -> Option<ApiError> {
    if value < min || value > max {
        return Some(ApiError::invalid_parameter(
            ctx,
            name,
            format!("value {value} is outside [{min}, {max}]"),
        ));
    }
    None
}

/// The value must be strictly positive.
pub fn require_positive(ctx: &RequestContext, name: &str, value: i64) -> Option<ApiError> {
    if value <= 0 {
        return Some(ApiError::invalid_parameter(
            ctx,
            name,
            "value must be positive",
        ));
    }
    None
}
