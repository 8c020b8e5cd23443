//! Cooperative cancellation signal for a running ingest batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply cloneable flag a caller can set from outside the batch loop
/// (e.g. a Ctrl-C handler) to ask [`crate::process_directory`] to stop
/// starting new files. The run finishes whatever file is already in
/// flight, commits everything decided so far, and returns with
/// [`crate::RunStatus::Aborted`] instead of dropping partial work.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation. Idempotent; safe to call from any thread.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled() {
        assert!(!CancellationToken::new().is_cancelled());
    }

    #[test]
    fn cancellation_is_visible_through_a_clone() {
        let token = CancellationToken::new();
        let handle = token.clone();
        handle.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn default_starts_uncancelled() {
        assert!(!CancellationToken::default().is_cancelled());
    }
}
