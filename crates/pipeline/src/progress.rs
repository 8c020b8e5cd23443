//! Progress events emitted during a run: processed count, total count,
//! throughput (EMA over the last 60 s), duplicate count, and error count,
//! at a cadence of at most once per second.

use std::time::{Duration, Instant};

/// One progress snapshot, handed to the caller's callback.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub processed: usize,
    pub total: usize,
    /// Exponentially-weighted moving average of files/sec, smoothed over
    /// roughly the last 60 seconds of activity.
    pub throughput_per_sec: f64,
    pub duplicates: usize,
    pub errors: usize,
}

/// EMA-smoothed throughput tracker plus the cadence gate that keeps
/// progress events at or below 1/s regardless of how often
/// [`ProgressTracker::record_file`] is called.
pub struct ProgressTracker {
    total: usize,
    processed: usize,
    duplicates: usize,
    errors: usize,
    last_emit: Instant,
    last_sample: Instant,
    ema_per_sec: f64,
    min_interval: Duration,
    /// Smoothing window for the EMA, in seconds.
    smoothing_secs: f64,
}

impl ProgressTracker {
    pub fn new(total: usize, min_interval: Duration) -> Self {
        let now = Instant::now();
        ProgressTracker {
            total,
            processed: 0,
            duplicates: 0,
            errors: 0,
            last_emit: now,
            last_sample: now,
            ema_per_sec: 0.0,
            min_interval,
            smoothing_secs: 60.0,
        }
    }

    /// Record that one file finished processing. `was_duplicate` and
    /// `was_error` update the running counters; the EMA is updated on
    /// every call so the smoothing window stays accurate even if the
    /// caller only emits events occasionally.
    pub fn record_file(&mut self, was_duplicate: bool, was_error: bool) {
        self.processed += 1;
        if was_duplicate {
            self.duplicates += 1;
        }
        if was_error {
            self.errors += 1;
        }

        let now = Instant::now();
        let dt = now.duration_since(self.last_sample).as_secs_f64().max(1e-6);
        let instantaneous = 1.0 / dt;
        let alpha = (1.0 / self.smoothing_secs).min(1.0);
        self.ema_per_sec = alpha * instantaneous + (1.0 - alpha) * self.ema_per_sec;
        self.last_sample = now;
    }

    /// `Some(event)` if at least `min_interval` has elapsed since the last
    /// emitted event, else `None` — callers should call this after every
    /// [`Self::record_file`] and only forward `Some` results downstream.
    pub fn maybe_emit(&mut self) -> Option<ProgressEvent> {
        let now = Instant::now();
        if now.duration_since(self.last_emit) < self.min_interval {
            return None;
        }
        self.last_emit = now;
        Some(self.snapshot())
    }

    /// Force an event regardless of cadence, used for the final event at
    /// the end of a run.
    pub fn snapshot(&self) -> ProgressEvent {
        ProgressEvent {
            processed: self.processed,
            total: self.total,
            throughput_per_sec: self.ema_per_sec,
            duplicates: self.duplicates,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_gate_suppresses_rapid_events() {
        let mut tracker = ProgressTracker::new(10, Duration::from_secs(1));
        tracker.record_file(false, false);
        assert!(tracker.maybe_emit().is_some());
        tracker.record_file(false, false);
        assert!(tracker.maybe_emit().is_none());
    }

    #[test]
    fn counts_accumulate() {
        let mut tracker = ProgressTracker::new(3, Duration::from_millis(0));
        tracker.record_file(true, false);
        tracker.record_file(false, true);
        tracker.record_file(false, false);
        let snap = tracker.snapshot();
        assert_eq!(snap.processed, 3);
        assert_eq!(snap.duplicates, 1);
        assert_eq!(snap.errors, 1);
    }
}
