//! # Pipeline Module
//!
//! The batched concurrent dispatch pipeline.
//!
//! Paths flow one direction: submissions are partitioned into batches,
//! wrapped in jobs, and drained by a bounded worker pool; each finished job
//! bumps the progress counters and triggers observer notification. Control
//! flows the other direction: the producer can clear pending jobs, resize
//! the pool, or shut execution down at any point.
//!
//! ## Modules
//! - `progress` - Counters for submitted vs. completed items
//! - `job` - The executable wrapper around one batch
//! - `pool` - The fixed-size, resizable worker pool
//! - `producer` - The façade composing everything

mod job;
mod pool;
mod producer;
mod progress;

pub use job::HashJob;
pub use pool::{CancellationToken, WorkerPool, WorkerPoolConfig};
pub use producer::{HashProducer, HashProducerBuilder};
pub use progress::ProgressTracker;
