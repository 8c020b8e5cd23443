//! Bounding one blocking operation to a wall-clock deadline.
//!
//! File hashing and text extraction are synchronous filesystem/CPU work
//! with no natural cancellation point partway through, so the only way to
//! bound one is to run it on its own thread and stop waiting once the
//! deadline passes. A file that overruns is left running in the
//! background; its result is simply dropped when it eventually finishes.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Run `op` to completion on a dedicated thread, waiting at most
/// `timeout`. Returns `None` if the deadline passed first.
pub fn run_with_timeout<T: Send + 'static>(
    timeout: Duration,
    op: impl FnOnce() -> T + Send + 'static,
) -> Option<T> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(op());
    });
    rx.recv_timeout(timeout).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_the_result_when_it_finishes_in_time() {
        let result = run_with_timeout(Duration::from_secs(5), || 2 + 2);
        assert_eq!(result, Some(4));
    }

    #[test]
    fn returns_none_once_the_deadline_passes() {
        let result = run_with_timeout(Duration::from_millis(20), || {
            thread::sleep(Duration::from_millis(500));
            "too slow"
        });
        assert_eq!(result, None);
    }
}
