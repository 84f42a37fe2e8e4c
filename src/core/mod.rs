//! # Core Module
//!
//! The GUI-agnostic perceptual-hash engine.
//!
//! ## Modules
//! - `scanner` - Discovers image files under root directories
//! - `batch` - Partitions path lists into fixed-size work batches
//! - `pipeline` - Dispatches batches onto a bounded worker pool
//! - `hasher` - Computes perceptual hashes
//! - `store` - Persists computed hashes
//! - `index` - Answers "find all hashes within distance D" queries

pub mod batch;
pub mod hasher;
pub mod index;
pub mod pipeline;
pub mod scanner;
pub mod store;

// Re-export commonly used types
pub use hasher::{DctHasher, HashWorker, Phash};
pub use index::SimilarityIndex;
pub use pipeline::{HashProducer, ProgressTracker, WorkerPool};
pub use store::{HashStore, InMemoryStore, SqliteStore};
