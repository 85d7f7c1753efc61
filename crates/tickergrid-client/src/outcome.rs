//! Outcome of one logical request, including all of its retries.

use crate::error::ApiClientError;

/// Tagged result driving retry and cache decisions. Lives for exactly one
/// logical request; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome<T> {
    /// The request produced a payload.
    Success(T),
    /// An attempt failed but the policy allows another; `attempt` is the
    /// 0-based index of the failed attempt.
    RetryableFailure { error: ApiClientError, attempt: u32 },
    /// No further attempts will be made.
    TerminalFailure(ApiClientError),
}

impl<T> RequestOutcome<T> {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::TerminalFailure(_))
    }

    /// Collapse into a plain result, treating a still-retryable failure as
    /// terminal (used when a caller gives up early).
    pub fn into_result(self) -> Result<T, ApiClientError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::RetryableFailure { error, .. } | Self::TerminalFailure(error) => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RequestOutcome<U> {
        match self {
            Self::Success(value) => RequestOutcome::Success(f(value)),
            Self::RetryableFailure { error, attempt } => {
                RequestOutcome::RetryableFailure { error, attempt }
            }
            Self::TerminalFailure(error) => RequestOutcome::TerminalFailure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_terminal_states_are_terminal() {
        assert!(RequestOutcome::Success(1).is_terminal());
        assert!(
            RequestOutcome::<i32>::TerminalFailure(ApiClientError::transport("down"))
                .is_terminal()
        );
        assert!(!RequestOutcome::<i32>::RetryableFailure {
            error: ApiClientError::transport("down"),
            attempt: 0,
        }
        .is_terminal());
    }

    #[test]
    fn map_preserves_failure_detail() {
        let outcome: RequestOutcome<i32> = RequestOutcome::RetryableFailure {
            error: ApiClientError::transport("down"),
            attempt: 2,
        };

        match outcome.map(|v| v * 2) {
            RequestOutcome::RetryableFailure { attempt, .. } => assert_eq!(attempt, 2),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
