//! # Store Module
//!
//! Persists computed perceptual hashes keyed by image path.
//!
//! Backends must tolerate concurrent `store` calls from different worker
//! threads. Store failures inside a running job are logged, never
//! propagated; downstream consumers read the surviving entries through
//! `entries` to populate a similarity index.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::core::hasher::Phash;
use crate::error::StoreError;
use std::path::{Path, PathBuf};

/// Trait for hash persistence backends
pub trait HashStore: Send + Sync {
    /// Persist the hash for `path`, replacing any previous entry.
    fn store(&self, path: &Path, hash: Phash) -> Result<(), StoreError>;

    /// Look up the stored hash for `path`, if any.
    fn get(&self, path: &Path) -> Result<Option<Phash>, StoreError>;

    /// All stored entries, in no particular order.
    fn entries(&self) -> Result<Vec<(PathBuf, Phash)>, StoreError>;

    /// Number of stored entries
    fn len(&self) -> Result<usize, StoreError>;

    /// Whether the store holds no entries
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
