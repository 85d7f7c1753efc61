//! Cancellation handle for one logical request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag for a logical request and all of its retries.
///
/// Cancelling is one-way and sticky. A cancelled token suppresses pending
/// retries and makes guarded cache writes no-ops, so a late network
/// completion can never resurface through the cache.
#[derive(Debug, Clone, Default)]
pub struct RequestToken {
    cancelled: Arc<AtomicBool>,
}

impl RequestToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_sticky_and_shared() {
        let token = RequestToken::new();
        let observer = token.clone();

        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());

        token.cancel();
        assert!(observer.is_cancelled());
    }
}
