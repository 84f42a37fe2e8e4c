//! The executable wrapper around one batch of paths.

use super::pool::CancellationToken;
use super::progress::ProgressTracker;
use crate::core::hasher::HashWorker;
use crate::core::store::HashStore;
use crate::events::ObserverRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Hashes every path in one batch and reports the batch to the progress
/// tracker exactly once.
///
/// Per-item failures (unreadable file, decode error, store error) are
/// logged and the job continues with the remaining items; a failed item
/// still counts as processed. When the pool's cancellation token fires,
/// the job stops between items and reports only what it attempted.
pub struct HashJob {
    batch: Vec<PathBuf>,
    hasher: Arc<dyn HashWorker>,
    store: Arc<dyn HashStore>,
    tracker: Arc<ProgressTracker>,
    observers: Arc<ObserverRegistry>,
}

impl HashJob {
    pub fn new(
        batch: Vec<PathBuf>,
        hasher: Arc<dyn HashWorker>,
        store: Arc<dyn HashStore>,
        tracker: Arc<ProgressTracker>,
        observers: Arc<ObserverRegistry>,
    ) -> Self {
        Self {
            batch,
            hasher,
            store,
            tracker,
            observers,
        }
    }

    /// Number of paths in this job's batch
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Execute the job. Consumes the job; a job runs exactly once.
    pub fn run(self, cancel: &CancellationToken) {
        let mut attempted = 0;

        for path in &self.batch {
            if cancel.is_cancelled() {
                debug!(
                    "Job interrupted after {} of {} items",
                    attempted,
                    self.batch.len()
                );
                break;
            }

            match self.hasher.compute_hash(path) {
                Ok(hash) => {
                    if let Err(e) = self.store.store(path, hash) {
                        warn!("Failed to store hash for {}: {}", path.display(), e);
                    }
                }
                Err(e) => {
                    warn!("Failed to hash {}: {}", path.display(), e);
                }
            }

            attempted += 1;
        }

        self.tracker.add_processed(attempted);
        self.observers
            .notify(self.tracker.processed(), self.tracker.total());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::Phash;
    use crate::core::store::InMemoryStore;
    use crate::error::HashError;
    use crate::events::ProgressObserver;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hashes path lengths; fails on paths containing "bad".
    struct StubHasher;

    impl HashWorker for StubHasher {
        fn compute_hash(&self, path: &Path) -> Result<Phash, HashError> {
            if path.to_string_lossy().contains("bad") {
                return Err(HashError::DecodeError {
                    path: path.to_path_buf(),
                    reason: "stub failure".to_string(),
                });
            }
            Ok(Phash(path.as_os_str().len() as u64))
        }
    }

    struct LastUpdate {
        processed: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ProgressObserver for LastUpdate {
        fn on_progress(&self, processed: usize, _total: usize) {
            self.processed.store(processed, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn job_parts() -> (
        Arc<InMemoryStore>,
        Arc<ProgressTracker>,
        Arc<ObserverRegistry>,
        Arc<LastUpdate>,
    ) {
        let store = Arc::new(InMemoryStore::new());
        let tracker = Arc::new(ProgressTracker::new());
        let observers = Arc::new(ObserverRegistry::new());
        let update = Arc::new(LastUpdate {
            processed: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        });
        observers.add(update.clone());
        (store, tracker, observers, update)
    }

    #[test]
    fn successful_batch_stores_hashes_and_reports_once() {
        let (store, tracker, observers, update) = job_parts();
        let batch = vec![PathBuf::from("/a.jpg"), PathBuf::from("/bb.jpg")];
        tracker.add_total(2);

        let job = HashJob::new(
            batch,
            Arc::new(StubHasher),
            store.clone(),
            tracker.clone(),
            observers,
        );
        job.run(&CancellationToken::new());

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(tracker.processed(), 2);
        assert_eq!(update.processed.load(Ordering::SeqCst), 2);
        assert_eq!(update.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_items_still_count_as_processed() {
        let (store, tracker, observers, _update) = job_parts();
        let batch = vec![
            PathBuf::from("/good.jpg"),
            PathBuf::from("/bad.jpg"),
            PathBuf::from("/also-good.jpg"),
        ];
        tracker.add_total(3);

        let job = HashJob::new(
            batch,
            Arc::new(StubHasher),
            store.clone(),
            tracker.clone(),
            observers,
        );
        job.run(&CancellationToken::new());

        // The bad file is skipped but the batch completes.
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(tracker.processed(), 3);
    }

    #[test]
    fn all_failures_still_make_progress() {
        let (store, tracker, observers, _update) = job_parts();
        let batch = vec![PathBuf::from("/bad1.jpg"), PathBuf::from("/bad2.jpg")];
        tracker.add_total(2);

        let job = HashJob::new(
            batch,
            Arc::new(StubHasher),
            store.clone(),
            tracker.clone(),
            observers,
        );
        job.run(&CancellationToken::new());

        assert_eq!(store.len().unwrap(), 0);
        assert_eq!(tracker.processed(), 2);
    }

    #[test]
    fn cancelled_job_reports_only_attempted_items() {
        let (store, tracker, observers, _update) = job_parts();
        let batch = vec![PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")];
        tracker.add_total(2);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let job = HashJob::new(batch, Arc::new(StubHasher), store, tracker.clone(), observers);
        job.run(&cancel);

        assert_eq!(tracker.processed(), 0);
    }
}
