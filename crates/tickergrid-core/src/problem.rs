//! Wire-format error payload shared by the server and the client.
//!
//! Every error response emitted by the HTTP tier is a single [`Problem`]
//! document. The shape is stable: clients key retry and cache decisions off
//! `status`, and support correlates reports with server logs via `traceId`.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::ValidationError;

/// Error statuses this pipeline is allowed to emit. No other code ever
/// crosses the wire as a `Problem`.
pub const SUPPORTED_STATUSES: [u16; 8] = [400, 401, 403, 404, 408, 409, 422, 500];

/// Default `type` URI for problems without a more specific category page.
pub const BLANK_TYPE: &str = "about:blank";

/// Canonical reason phrase for each supported status.
pub const fn status_title(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Timeout",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Machine-consumable error payload.
///
/// Instances are immutable once built; the only way to vary one is through
/// the consuming `with_*` builders at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
}

impl Problem {
    /// Build a problem for one of the supported statuses.
    ///
    /// The title is derived from the status so that equal statuses always
    /// carry equal titles. `trace_id` must be non-empty.
    pub fn new(
        status: u16,
        detail: impl Into<String>,
        instance: impl Into<String>,
        trace_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if !SUPPORTED_STATUSES.contains(&status) {
            return Err(ValidationError::UnsupportedStatus { status });
        }

        let trace_id = trace_id.into();
        if trace_id.trim().is_empty() {
            return Err(ValidationError::EmptyTraceId);
        }

        Ok(Self {
            type_uri: String::from(BLANK_TYPE),
            title: String::from(status_title(status)),
            status,
            detail: detail.into(),
            instance: instance.into(),
            trace_id,
            timestamp: Some(rfc3339_now()),
            errors: Vec::new(),
        })
    }

    /// Override the `type` URI for problems with a dedicated category page.
    pub fn with_type(mut self, type_uri: impl Into<String>) -> Self {
        self.type_uri = type_uri.into();
        self
    }

    /// Override the derived title. Empty titles are rejected.
    pub fn with_title(mut self, title: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        self.title = title;
        Ok(self)
    }

    /// Attach field-level violations. Each violation has already validated
    /// its own field name.
    pub fn with_violations(mut self, violations: Vec<FieldViolation>) -> Self {
        self.errors = violations;
        self
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// A single violated field in a validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(ValidationError::EmptyFieldName);
        }

        Ok(Self {
            field,
            message: message.into(),
            value: None,
        })
    }

    /// Attach the rejected value for diagnostics.
    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

fn rfc3339_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
