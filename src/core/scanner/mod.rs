//! # Scanner Module
//!
//! Discovers image files under root directories to feed the pipeline.

use crate::error::ScanError;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// File extensions treated as images
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp",
];

/// Configuration for directory scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_depth: None,
        }
    }
}

/// Check if a path has a supported image extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Collect image file paths under the given roots, in traversal order.
///
/// A missing root is an error; unreadable entries below a valid root are
/// logged and skipped so one bad directory doesn't abort the scan.
pub fn find_images(roots: &[PathBuf], config: &ScanConfig) -> Result<Vec<PathBuf>, ScanError> {
    let mut images = Vec::new();

    for root in roots {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound { path: root.clone() });
        }

        let mut walker = WalkDir::new(root).follow_links(config.follow_symlinks);
        if let Some(depth) = config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = config.include_hidden;
        let iter = walker.into_iter().filter_entry(move |entry| {
            include_hidden || entry.depth() == 0 || !is_hidden(entry.path())
        });

        for entry in iter {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && is_image_file(path) {
                        images.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                }
            }
        }
    }

    Ok(images)
}
