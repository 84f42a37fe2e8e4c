//! The pipeline façade: accepts path submissions, partitions them into
//! batches, and dispatches the batches onto the worker pool.

use super::job::HashJob;
use super::pool::{WorkerPool, WorkerPoolConfig};
use super::progress::ProgressTracker;
use crate::core::batch::{batches, DEFAULT_BATCH_CAPACITY};
use crate::core::hasher::{DctHasher, HashWorker};
use crate::core::store::{HashStore, InMemoryStore};
use crate::events::{ObserverRegistry, ProgressObserver};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builder for [`HashProducer`]
pub struct HashProducerBuilder {
    hasher: Option<Arc<dyn HashWorker>>,
    store: Option<Arc<dyn HashStore>>,
    batch_capacity: usize,
    pool: WorkerPoolConfig,
}

impl HashProducerBuilder {
    /// Create a builder with defaults: DCT hasher, in-memory store,
    /// batch capacity 10, pool size 2, idle timeout 10 s.
    pub fn new() -> Self {
        Self {
            hasher: None,
            store: None,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            pool: WorkerPoolConfig::default(),
        }
    }

    /// Set the hash-computation collaborator
    pub fn hasher(mut self, hasher: Arc<dyn HashWorker>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Set the persistence collaborator
    pub fn store(mut self, store: Arc<dyn HashStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the number of paths per job batch (must be >= 1)
    pub fn batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = capacity.max(1);
        self
    }

    /// Set the worker pool size
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool.pool_size = pool_size.max(1);
        self
    }

    /// Set how long idle worker threads linger before being reclaimed
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool.idle_timeout = timeout;
        self
    }

    /// Build the producer
    pub fn build(self) -> HashProducer {
        HashProducer {
            hasher: self
                .hasher
                .unwrap_or_else(|| Arc::new(DctHasher::new())),
            store: self.store.unwrap_or_else(|| Arc::new(InMemoryStore::new())),
            tracker: Arc::new(ProgressTracker::new()),
            observers: Arc::new(ObserverRegistry::new()),
            pool: WorkerPool::new(self.pool),
            batch_capacity: self.batch_capacity,
        }
    }
}

impl Default for HashProducerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns lists of image paths into hashing jobs on a bounded worker pool.
///
/// Owns the batch partitioner, worker pool, progress tracker, and
/// observer registry. Submission never blocks on worker availability;
/// completion order across workers is nondeterministic.
pub struct HashProducer {
    hasher: Arc<dyn HashWorker>,
    store: Arc<dyn HashStore>,
    tracker: Arc<ProgressTracker>,
    observers: Arc<ObserverRegistry>,
    pool: WorkerPool,
    batch_capacity: usize,
}

impl HashProducer {
    /// Create a producer builder
    pub fn builder() -> HashProducerBuilder {
        HashProducerBuilder::new()
    }

    /// Submit paths for hashing.
    ///
    /// Increments `total` by the number of paths, partitions them into
    /// batches, enqueues one job per batch, and notifies observers with
    /// the updated totals without waiting for any job to run.
    pub fn add_to_load(&self, paths: Vec<PathBuf>) {
        self.tracker.add_total(paths.len());

        let cancel = self.pool.cancellation_token();
        for batch in batches(paths, self.batch_capacity) {
            let job = HashJob::new(
                batch,
                Arc::clone(&self.hasher),
                Arc::clone(&self.store),
                Arc::clone(&self.tracker),
                Arc::clone(&self.observers),
            );
            let cancel = cancel.clone();
            self.pool.execute(Box::new(move || job.run(&cancel)));
        }

        self.observers
            .notify(self.tracker.processed(), self.tracker.total());
    }

    /// Submit a single path for hashing
    pub fn add_path(&self, path: PathBuf) {
        self.add_to_load(vec![path]);
    }

    /// Discard queued-but-unstarted jobs and zero both counters.
    ///
    /// Jobs already running continue; a late completion after a clear can
    /// push `processed` above `total` (accepted race).
    pub fn clear(&self) {
        let discarded = self.pool.clear_queue();
        self.tracker.reset();
        self.observers.notify(0, 0);
        info!("Job queue cleared, {} pending jobs discarded", discarded);
    }

    /// The persistence collaborator, for downstream index population
    pub fn store(&self) -> Arc<dyn HashStore> {
        Arc::clone(&self.store)
    }

    /// Items ever submitted since the last clear
    pub fn total(&self) -> usize {
        self.tracker.total()
    }

    /// Items finished (success or failure) since the last clear
    pub fn processed(&self) -> usize {
        self.tracker.processed()
    }

    /// Jobs queued but not yet started
    pub fn pending_jobs(&self) -> usize {
        self.pool.pending_jobs()
    }

    /// Target worker count
    pub fn pool_size(&self) -> usize {
        self.pool.pool_size()
    }

    /// Change the worker count; zero is rejected with a warning
    pub fn set_pool_size(&self, pool_size: usize) {
        self.pool.set_pool_size(pool_size);
    }

    /// Register a progress observer
    pub fn add_observer(&self, observer: Arc<dyn ProgressObserver>) {
        self.observers.add(observer);
    }

    /// Remove a previously registered observer by handle
    pub fn remove_observer(&self, observer: &Arc<dyn ProgressObserver>) -> bool {
        self.observers.remove(observer)
    }

    /// Let queued and in-flight jobs finish, then stop. Non-blocking;
    /// poll [`HashProducer::is_terminated`].
    pub fn shutdown_graceful(&self) {
        self.pool.shutdown_graceful();
    }

    /// Interrupt running jobs and discard queued ones, best-effort.
    pub fn shutdown_now(&self) {
        self.pool.shutdown_now();
    }

    /// True once a requested shutdown has fully completed
    pub fn is_terminated(&self) -> bool {
        self.pool.is_terminated()
    }
}
