//! Process-wide progress counters.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for items ever submitted (`total`) and items whose job has
/// finished, success or failure (`processed`).
///
/// Each counter is individually atomic but the pair is not updated
/// jointly: a reader racing with submissions may observe a `total` that is
/// ahead of or behind `processed` mid-flight. Once all in-flight additions
/// settle the pair is stable. `reset` assumes no jobs are in flight; a
/// late-arriving completion after a reset can push `processed` above
/// `total`. That race is accepted, not silently prevented.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    total: AtomicUsize,
    processed: AtomicUsize,
}

impl ProgressTracker {
    /// Create a tracker with both counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `n` newly submitted items
    pub fn add_total(&self, n: usize) {
        self.total.fetch_add(n, Ordering::SeqCst);
    }

    /// Record `n` items whose job has finished
    pub fn add_processed(&self, n: usize) {
        self.processed.fetch_add(n, Ordering::SeqCst);
    }

    /// Items ever submitted since the last reset
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Items finished since the last reset
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    /// Zero both counters. Callers must ensure no jobs are in flight.
    pub fn reset(&self) {
        self.processed.store(0, Ordering::SeqCst);
        self.total.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counters_start_at_zero() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.total(), 0);
        assert_eq!(tracker.processed(), 0);
    }

    #[test]
    fn additions_accumulate() {
        let tracker = ProgressTracker::new();
        tracker.add_total(10);
        tracker.add_total(15);
        tracker.add_processed(10);

        assert_eq!(tracker.total(), 25);
        assert_eq!(tracker.processed(), 10);
    }

    #[test]
    fn reset_zeroes_both_counters() {
        let tracker = ProgressTracker::new();
        tracker.add_total(25);
        tracker.add_processed(25);

        tracker.reset();

        assert_eq!(tracker.total(), 0);
        assert_eq!(tracker.processed(), 0);
    }

    #[test]
    fn concurrent_additions_are_not_lost() {
        let tracker = Arc::new(ProgressTracker::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        tracker.add_total(1);
                        tracker.add_processed(1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.total(), 8000);
        assert_eq!(tracker.processed(), 8000);
    }
}
