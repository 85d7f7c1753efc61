//! Internal failure taxonomy.
//!
//! A [`Failure`] is what a handler or a collaborator (storage, upstream
//! feed) reports when it cannot complete. It never crosses the wire as-is:
//! the web tier's classifier maps it to a `Problem` with a fixed status,
//! and only the log sink ever sees the raw message.

use std::fmt::{Display, Formatter};

/// Classification key for internal failures, evaluated top-to-bottom by the
/// web tier's classifier with `Unknown` as the default arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A required argument was missing or malformed.
    InvalidArgument,
    /// A lookup missed: the requested resource does not exist.
    NotFound,
    /// The caller is not authenticated for the operation.
    Unauthorized,
    /// The operation exceeded its time budget.
    Timeout,
    /// Anything else, including storage faults and bugs.
    Unknown,
}

/// Structured internal failure carried to the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: FailureKind,
    message: String,
}

impl Failure {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InvalidArgument,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::NotFound,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Unauthorized,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Unknown,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Raw internal message. Log-only for `Unknown` failures.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FailureKind::InvalidArgument => "failure.invalid_argument",
            FailureKind::NotFound => "failure.not_found",
            FailureKind::Unauthorized => "failure.unauthorized",
            FailureKind::Timeout => "failure.timeout",
            FailureKind::Unknown => "failure.unknown",
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for Failure {}
