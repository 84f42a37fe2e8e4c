//! In-memory store backend for testing and single-run use.

use super::HashStore;
use crate::core::hasher::Phash;
use crate::error::StoreError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory hash store
///
/// Useful for tests and scenarios where persistence isn't needed.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<PathBuf, Phash>>,
}

impl InMemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl HashStore for InMemoryStore {
    fn store(&self, path: &Path, hash: Phash) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(path.to_path_buf(), hash);
        Ok(())
    }

    fn get(&self, path: &Path) -> Result<Option<Phash>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(path).copied())
    }

    fn entries(&self) -> Result<Vec<(PathBuf, Phash)>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.iter().map(|(p, h)| (p.clone(), *h)).collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn store_and_get_round_trip() {
        let store = InMemoryStore::new();
        store.store(Path::new("/a.jpg"), Phash(42)).unwrap();

        assert_eq!(store.get(Path::new("/a.jpg")).unwrap(), Some(Phash(42)));
        assert_eq!(store.get(Path::new("/b.jpg")).unwrap(), None);
    }

    #[test]
    fn store_replaces_existing_entry() {
        let store = InMemoryStore::new();
        store.store(Path::new("/a.jpg"), Phash(1)).unwrap();
        store.store(Path::new("/a.jpg"), Phash(2)).unwrap();

        assert_eq!(store.get(Path::new("/a.jpg")).unwrap(), Some(Phash(2)));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn concurrent_stores_do_not_lose_entries() {
        let store = Arc::new(InMemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        let path = PathBuf::from(format!("/photos/{worker}-{i}.jpg"));
                        store.store(&path, Phash(i)).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len().unwrap(), 8 * 50);
    }
}
