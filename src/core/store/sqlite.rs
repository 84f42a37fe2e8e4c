//! SQLite store backend for persistent hash storage.

use super::HashStore;
use crate::core::hasher::Phash;
use crate::error::StoreError;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// SQLite-backed persistent hash store
///
/// Uses WAL (Write-Ahead Logging) mode for better concurrent access.
/// The connection is serialized behind a mutex; worker threads block
/// briefly on each other only for the duration of one insert.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a hash database at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| StoreError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // WAL allows readers to proceed even while writes are happening
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS image_hashes (
                path TEXT PRIMARY KEY,
                phash INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl HashStore for SqliteStore {
    fn store(&self, path: &Path, hash: Phash) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO image_hashes (path, phash) VALUES (?1, ?2)",
            params![path.to_string_lossy(), hash.as_u64() as i64],
        )
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    fn get(&self, path: &Path) -> Result<Option<Phash>, StoreError> {
        let conn = self.lock()?;
        let value: Option<i64> = conn
            .query_row(
                "SELECT phash FROM image_hashes WHERE path = ?1",
                [path.to_string_lossy()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(value.map(|v| Phash(v as u64)))
    }

    fn entries(&self) -> Result<Vec<(PathBuf, Phash)>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT path, phash FROM image_hashes")
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let path: String = row.get(0)?;
                let phash: i64 = row.get(1)?;
                Ok((PathBuf::from(path), Phash(phash as u64)))
            })
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }

    fn len(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM image_hashes", [], |row| row.get(0))
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(count as usize)
    }
}
