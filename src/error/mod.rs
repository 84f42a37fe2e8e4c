//! # Error Module
//!
//! Error types for the perceptual-hash pipeline.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Absorb at the job boundary** - per-item failures are logged and
//!   counted, never propagated out of a running job

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering image paths
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur during perceptual hashing
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Hash computation failed for {path}: {reason}")]
    ComputationFailed { path: PathBuf, reason: String },
}

/// Errors that occur while persisting hashes
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open hash database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Store is locked or poisoned")]
    Poisoned,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PipelineError>;
