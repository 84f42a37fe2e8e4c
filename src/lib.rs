//! # phash-pipeline
//!
//! A batched concurrent pipeline that turns large lists of image paths into
//! perceptual-hash fingerprints and makes them searchable by similarity.
//!
//! ## Core Philosophy
//! - **Bounded resource use** - A fixed, resizable worker pool keeps
//!   concurrent image decoding deterministic
//! - **Never lose progress** - Every submitted path counts toward progress,
//!   whether hashing succeeded or failed
//! - **Failures are isolated** - One unreadable file never aborts its batch
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - Batching, dispatch, hashing, persistence, and similarity search
//! - `events` - Observer-based progress reporting (GUI-ready)
//! - `error` - Error types for each stage
//! - `cli` - Command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PipelineError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
