//! Retry decisions and exponential backoff.

use std::time::Duration;

use crate::error::ApiClientError;

/// Whether a request mutates server state. Mutations get a tighter retry
/// bound so duplicate side effects stay bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Query,
    Mutation,
}

/// Retry and backoff configuration for one client.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry ceiling for transient failures on queries.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Backoff cap.
    pub max_delay: Duration,
    /// Apply +/- 50% random jitter to computed delays. Off by default so
    /// the schedule is the documented formula.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(3),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Decide whether to retry after a failed attempt.
    ///
    /// `attempt` is 0-based: the first failure is attempt 0. Transient
    /// failures retry while `attempt` is below the ceiling; every other
    /// category is terminal immediately. Mutations cap the ceiling at one
    /// retry regardless of configuration.
    pub fn should_retry(&self, error: &ApiClientError, kind: RequestKind, attempt: u32) -> bool {
        if !error.retryable() {
            return false;
        }

        let ceiling = match kind {
            RequestKind::Query => self.max_retries,
            RequestKind::Mutation => self.max_retries.min(1),
        };

        attempt < ceiling
    }

    /// Backoff before retry `attempt` (0-based):
    /// `min(base_delay * 2^attempt, max_delay)`, optionally jittered.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scale = 2_f64.powi(attempt.min(i32::MAX as u32) as i32);
        let seconds = self.base_delay.as_secs_f64() * scale;
        let capped = seconds.min(self.max_delay.as_secs_f64());
        let mut delay = Duration::from_secs_f64(capped);

        if self.jitter {
            let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
            let offset = fastrand::u64(0..=(jitter_ms * 2)) as i64 - jitter_ms as i64;
            let total_ms = delay.as_millis() as i64 + offset;
            delay = Duration::from_millis(total_ms.max(0) as u64);
        }

        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> ApiClientError {
        ApiClientError::from_status(500, "upstream exploded")
    }

    fn client_input() -> ApiClientError {
        ApiClientError::from_status(400, "bad payload")
    }

    #[test]
    fn transient_queries_retry_up_to_the_ceiling() {
        let policy = RetryPolicy::default();
        let error = transient();

        for attempt in 0..3 {
            assert!(policy.should_retry(&error, RequestKind::Query, attempt));
        }
        assert!(!policy.should_retry(&error, RequestKind::Query, 3));
    }

    #[test]
    fn rejected_requests_never_retry() {
        let policy = RetryPolicy::default();
        for status in [400, 401, 403, 404, 409, 422] {
            let error = ApiClientError::from_status(status, "rejected");
            assert!(
                !policy.should_retry(&error, RequestKind::Query, 0),
                "status {status} must not retry"
            );
        }
    }

    #[test]
    fn mutations_retry_at_most_once() {
        let policy = RetryPolicy::default();
        let error = transient();

        assert!(policy.should_retry(&error, RequestKind::Mutation, 0));
        assert!(!policy.should_retry(&error, RequestKind::Mutation, 1));
    }

    #[test]
    fn mutation_cap_never_widens_a_no_retry_policy() {
        let policy = RetryPolicy::no_retry();
        assert!(!policy.should_retry(&transient(), RequestKind::Mutation, 0));
        assert!(!policy.should_retry(&client_input(), RequestKind::Mutation, 0));
    }

    #[test]
    fn backoff_doubles_from_base_and_caps() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            ..RetryPolicy::default()
        };

        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for(4), Duration::from_secs(1));
        assert_eq!(policy.delay_for(10), Duration::from_secs(1));
    }

    #[test]
    fn jitter_stays_within_half_of_the_capped_delay() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            jitter: true,
            ..RetryPolicy::default()
        };

        for _ in 0..10 {
            for attempt in 0..5 {
                let expected = (100.0 * 2_f64.powi(attempt)).min(1000.0);
                let actual = policy.delay_for(attempt as u32).as_millis() as f64;
                assert!(actual >= expected * 0.49, "attempt {attempt}: {actual}");
                assert!(actual <= expected * 1.51, "attempt {attempt}: {actual}");
            }
        }
    }
}
