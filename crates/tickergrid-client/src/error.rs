//! Client-side error taxonomy.
//!
//! Every failed request collapses into an [`ApiClientError`]: either a
//! parsed `Problem` from the wire, a raw status when the body was not a
//! Problem document, or a transport-level fault. The [`ErrorCategory`]
//! derived from it is what retry and cache logic key off.

use std::fmt::{Display, Formatter};

use tickergrid_core::Problem;

/// Coarse failure classes driving retry and surfacing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 400/422: the request itself was rejected; surfaced verbatim.
    ClientInput,
    /// 401/403: triggers the re-authentication flow upstream.
    Auth,
    /// 404: resource missing.
    NotFound,
    /// 409: already exists or concurrent modification.
    Conflict,
    /// 408, 5xx, network faults: worth retrying.
    Transient,
    /// Cancelled locally by the caller; never retried, never surfaced as a
    /// server failure.
    Cancelled,
}

impl ErrorCategory {
    /// Classify an HTTP status. Anything not in the known client-error
    /// band is treated as transient.
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::ClientInput,
            401 | 403 => Self::Auth,
            404 => Self::NotFound,
            409 => Self::Conflict,
            _ => Self::Transient,
        }
    }

    pub const fn retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

/// A failed request, classified.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiClientError {
    category: ErrorCategory,
    status: Option<u16>,
    problem: Option<Problem>,
    message: String,
}

impl ApiClientError {
    /// From a parsed Problem document.
    pub fn from_problem(problem: Problem) -> Self {
        Self {
            category: ErrorCategory::from_status(problem.status),
            status: Some(problem.status),
            message: format!("{}: {}", problem.title, problem.detail),
            problem: Some(problem),
        }
    }

    /// From an error status whose body was not a Problem document. The
    /// contract degrades gracefully instead of failing the parse.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::from_status(status),
            status: Some(status),
            problem: None,
            message: message.into(),
        }
    }

    /// Network-level fault before any status was received.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Transient,
            status: None,
            problem: None,
            message: message.into(),
        }
    }

    /// The payload could not be encoded or decoded against the contract.
    /// Not retryable: the same bytes would fail again.
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::ClientInput,
            status: None,
            problem: None,
            message: message.into(),
        }
    }

    /// The caller cancelled the logical request.
    pub fn cancelled() -> Self {
        Self {
            category: ErrorCategory::Cancelled,
            status: None,
            problem: None,
            message: String::from("request was cancelled by the caller"),
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    /// Correlation id for support reports, when the server supplied one.
    pub fn trace_id(&self) -> Option<&str> {
        self.problem.as_ref().map(|p| p.trace_id.as_str())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.category.retryable()
    }
}

impl Display for ApiClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApiClientError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_band_maps_to_categories() {
        assert_eq!(ErrorCategory::from_status(400), ErrorCategory::ClientInput);
        assert_eq!(ErrorCategory::from_status(422), ErrorCategory::ClientInput);
        assert_eq!(ErrorCategory::from_status(401), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_status(403), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_status(404), ErrorCategory::NotFound);
        assert_eq!(ErrorCategory::from_status(409), ErrorCategory::Conflict);
        assert_eq!(ErrorCategory::from_status(408), ErrorCategory::Transient);
        assert_eq!(ErrorCategory::from_status(500), ErrorCategory::Transient);
        assert_eq!(ErrorCategory::from_status(503), ErrorCategory::Transient);
    }

    #[test]
    fn only_transient_is_retryable() {
        for category in [
            ErrorCategory::ClientInput,
            ErrorCategory::Auth,
            ErrorCategory::NotFound,
            ErrorCategory::Conflict,
            ErrorCategory::Cancelled,
        ] {
            assert!(!category.retryable(), "{category:?} must not retry");
        }
        assert!(ErrorCategory::Transient.retryable());
    }

    #[test]
    fn problem_errors_expose_the_trace_id() {
        let problem = Problem::new(404, "gone", "/stocks/AAPL", "trace-9").expect("valid");
        let error = ApiClientError::from_problem(problem);

        assert_eq!(error.category(), ErrorCategory::NotFound);
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.trace_id(), Some("trace-9"));
    }

    #[test]
    fn unparseable_bodies_degrade_to_status_classification() {
        let error = ApiClientError::from_status(502, "bad gateway");
        assert_eq!(error.category(), ErrorCategory::Transient);
        assert!(error.problem().is_none());
        assert!(error.retryable());
    }
}
