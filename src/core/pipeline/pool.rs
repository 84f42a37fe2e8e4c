//! Bounded, resizable worker pool draining an unbounded job queue.
//!
//! The pool never runs more than its configured number of worker threads,
//! so resource use from concurrent image decoding stays deterministic. The
//! queue is unbounded: `execute` never blocks the caller and never rejects.
//! Backpressure is intentionally absent at this layer.
//!
//! Workers are spawned on demand when jobs arrive and reclaimed after the
//! configured idle timeout, so an idle pool holds no threads. The pool may
//! transiently run fewer threads than the target; it converges as work
//! arrives.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// A unit of work accepted by the pool.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Cooperative cancellation flag shared between the pool and its jobs.
///
/// `shutdown_now` sets the flag; jobs are expected to check it between
/// work items. Cancellation is best-effort: an item already inside an
/// external call finishes at that collaborator's discretion.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Irreversible for the lifetime of the token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of concurrently-running workers the pool converges to
    pub pool_size: usize,
    /// How long an idle worker thread waits for work before exiting
    pub idle_timeout: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 2,
            idle_timeout: Duration::from_secs(10),
        }
    }
}

struct PoolShared {
    queue_tx: Sender<Job>,
    queue_rx: Receiver<Job>,
    target_size: AtomicUsize,
    live_workers: AtomicUsize,
    next_worker_id: AtomicUsize,
    shutdown: AtomicBool,
    cancel: CancellationToken,
    idle_timeout: Duration,
}

/// A fixed-size (but runtime-resizable) pool of threads executing jobs
/// from an unbounded queue.
pub struct WorkerPool {
    shared: Arc<PoolShared>,
}

impl WorkerPool {
    /// Create a pool. No threads are spawned until work arrives.
    pub fn new(config: WorkerPoolConfig) -> Self {
        let (queue_tx, queue_rx) = unbounded();
        let pool_size = config.pool_size.max(1);

        Self {
            shared: Arc::new(PoolShared {
                queue_tx,
                queue_rx,
                target_size: AtomicUsize::new(pool_size),
                live_workers: AtomicUsize::new(0),
                next_worker_id: AtomicUsize::new(0),
                shutdown: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                idle_timeout: config.idle_timeout,
            }),
        }
    }

    /// The token jobs should observe for forced-shutdown cancellation.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shared.cancel.clone()
    }

    /// Enqueue a job. Never blocks and never rejects while the pool is
    /// running; after a shutdown request the job is logged and dropped.
    pub fn execute(&self, job: Job) {
        if self.shared.shutdown.load(Ordering::SeqCst) || self.shared.cancel.is_cancelled() {
            warn!("Job submitted after shutdown request was discarded");
            return;
        }

        // The receiver lives in `shared`, so the channel can't be closed.
        let _ = self.shared.queue_tx.send(job);
        spawn_workers(&self.shared);
    }

    /// Target number of concurrently-running workers
    pub fn pool_size(&self) -> usize {
        self.shared.target_size.load(Ordering::SeqCst)
    }

    /// Worker threads currently alive (may lag behind the target)
    pub fn active_workers(&self) -> usize {
        self.shared.live_workers.load(Ordering::SeqCst)
    }

    /// Jobs queued but not yet picked up by a worker
    pub fn pending_jobs(&self) -> usize {
        self.shared.queue_rx.len()
    }

    /// Change the pool size. A size of zero is rejected with a warning
    /// and the prior size stays in effect. Running jobs are never
    /// restarted; the pool converges to the new size as work arrives.
    pub fn set_pool_size(&self, pool_size: usize) {
        if pool_size < 1 {
            warn!(
                "Pool size must be 1 or greater, {} is not valid and ignored",
                pool_size
            );
            return;
        }

        self.shared.target_size.store(pool_size, Ordering::SeqCst);
        spawn_workers(&self.shared);
    }

    /// Discard all queued-but-unstarted jobs. Jobs already running
    /// continue. Returns the number of jobs discarded.
    pub fn clear_queue(&self) -> usize {
        let mut discarded = 0;
        while self.shared.queue_rx.try_recv().is_ok() {
            discarded += 1;
        }
        discarded
    }

    /// Request shutdown after all queued and in-flight jobs complete.
    /// Returns immediately; poll [`WorkerPool::is_terminated`] to wait.
    pub fn shutdown_graceful(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        // Workers may all have idled out while jobs remain queued.
        spawn_workers(&self.shared);
    }

    /// Interrupt running jobs and discard queued ones, best-effort.
    pub fn shutdown_now(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.cancel.cancel();
        let discarded = self.clear_queue();
        debug!("Forced shutdown discarded {} queued jobs", discarded);
    }

    /// True only after a shutdown request once every worker thread has
    /// exited and no jobs remain queued.
    pub fn is_terminated(&self) -> bool {
        self.shared.shutdown.load(Ordering::SeqCst)
            && self.shared.live_workers.load(Ordering::SeqCst) == 0
            && self.shared.queue_rx.is_empty()
    }
}

/// Spawn workers up to the target size while there is queued work.
fn spawn_workers(shared: &Arc<PoolShared>) {
    loop {
        if shared.cancel.is_cancelled() || shared.queue_rx.is_empty() {
            return;
        }

        let live = shared.live_workers.load(Ordering::SeqCst);
        if live >= shared.target_size.load(Ordering::SeqCst) {
            return;
        }

        if shared
            .live_workers
            .compare_exchange(live, live + 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            continue;
        }

        let id = shared.next_worker_id.fetch_add(1, Ordering::SeqCst);
        let worker_shared = Arc::clone(shared);
        let spawned = thread::Builder::new()
            .name(format!("phash-worker-{id}"))
            .spawn(move || worker_main(worker_shared));

        if let Err(e) = spawned {
            shared.live_workers.fetch_sub(1, Ordering::SeqCst);
            warn!("Failed to spawn worker thread: {}", e);
            return;
        }
    }
}

fn worker_main(shared: Arc<PoolShared>) {
    debug!("Worker started");
    worker_loop(&shared);
    shared.live_workers.fetch_sub(1, Ordering::SeqCst);
    debug!("Worker exiting");

    // A job may have been enqueued while this worker was deciding to
    // exit; make sure someone is alive to run it.
    if !shared.cancel.is_cancelled() && !shared.queue_rx.is_empty() {
        spawn_workers(&shared);
    }
}

fn worker_loop(shared: &PoolShared) {
    loop {
        if shared.cancel.is_cancelled() {
            return;
        }

        // Shrink: excess workers exit between jobs.
        if shared.live_workers.load(Ordering::SeqCst) > shared.target_size.load(Ordering::SeqCst) {
            return;
        }

        if shared.shutdown.load(Ordering::SeqCst) {
            // Graceful drain: run whatever is queued, then exit.
            match shared.queue_rx.try_recv() {
                Ok(job) => job(),
                Err(_) => return,
            }
            continue;
        }

        match shared.queue_rx.recv_timeout(shared.idle_timeout) {
            Ok(job) => {
                if shared.cancel.is_cancelled() {
                    return;
                }
                job();
            }
            // Idle reclaim; a later submission respawns on demand.
            Err(RecvTimeoutError::Timeout) => return,
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}
