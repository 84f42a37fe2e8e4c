//! # Hasher Module
//!
//! Computes 64-bit DCT-based perceptual hashes (pHash) for images.
//!
//! ## How It Works
//! 1. Decode and shrink the image
//! 2. Run a discrete cosine transform over the luminance values
//! 3. Keep the low-frequency corner and threshold it against the mean
//! 4. Compare hashes using Hamming distance
//!
//! The [`HashWorker`] trait is the seam the pipeline dispatches through;
//! [`DctHasher`] is the shipped implementation, built on the `image_hasher`
//! crate. Workers must be safely callable from multiple pool threads at
//! once.

use crate::error::HashError;
use image_hasher::{HashAlg, HasherConfig, ImageHash};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A 64-bit perceptual hash.
///
/// Two hashes are compared by Hamming distance: the number of differing
/// bits. Lower distance = more similar images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Phash(pub u64);

impl Phash {
    /// Hamming distance to another hash (0..=64)
    pub fn distance(&self, other: &Phash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// The raw hash value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Hexadecimal rendering, 16 digits
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Phash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<&ImageHash> for Phash {
    fn from(hash: &ImageHash) -> Self {
        let mut value = [0u8; 8];
        for (slot, byte) in value.iter_mut().zip(hash.as_bytes()) {
            *slot = *byte;
        }
        Phash(u64::from_le_bytes(value))
    }
}

/// Computes a perceptual hash for one image path.
///
/// Implementations must tolerate concurrent calls from different worker
/// threads with no shared mutable state between calls.
pub trait HashWorker: Send + Sync {
    /// Hash the image at `path`. A failure covers only this one item.
    fn compute_hash(&self, path: &Path) -> Result<Phash, HashError>;
}

/// DCT-based perceptual hasher (pHash).
pub struct DctHasher {
    hasher: image_hasher::Hasher,
}

impl DctHasher {
    /// Create a hasher producing 64-bit DCT hashes.
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_alg(HashAlg::Mean)
            .hash_size(8, 8)
            .preproc_dct()
            .to_hasher();
        Self { hasher }
    }
}

impl Default for DctHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl HashWorker for DctHasher {
    fn compute_hash(&self, path: &Path) -> Result<Phash, HashError> {
        let image = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => HashError::IoError {
                path: path.to_path_buf(),
                source,
            },
            other => HashError::DecodeError {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;

        let hash = self.hasher.hash_image(&image);
        Ok(Phash::from(&hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    /// Minimal valid 1x1 PNG
    const TEST_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG header
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
        0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44,
        0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8, 0xFF, 0xFF, 0x3F, 0x00, 0x05, 0xFE, 0x02, 0xFE, 0xDC,
        0xCC, 0x59, 0xE7, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn distance_to_self_is_zero() {
        let hash = Phash(0xDEAD_BEEF_CAFE_F00D);
        assert_eq!(hash.distance(&hash), 0);
    }

    #[test]
    fn distance_counts_differing_bits() {
        assert_eq!(Phash(0).distance(&Phash(u64::MAX)), 64);
        assert_eq!(Phash(0b1010).distance(&Phash(0b0101)), 4);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Phash(0x00FF);
        let b = Phash(0xFF00);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn to_hex_is_zero_padded() {
        assert_eq!(Phash(0xAB).to_hex(), "00000000000000ab");
    }

    #[test]
    fn identical_files_hash_identically() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.png");
        let second = dir.path().join("b.png");
        File::create(&first).unwrap().write_all(TEST_PNG).unwrap();
        File::create(&second).unwrap().write_all(TEST_PNG).unwrap();

        let hasher = DctHasher::new();
        let hash_a = hasher.compute_hash(&first).unwrap();
        let hash_b = hasher.compute_hash(&second).unwrap();

        assert_eq!(hash_a, hash_b);
        assert_eq!(hash_a.distance(&hash_b), 0);
    }

    #[test]
    fn corrupt_file_yields_error_not_panic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.jpg");
        File::create(&path)
            .unwrap()
            .write_all(b"this is not an image")
            .unwrap();

        let hasher = DctHasher::new();
        assert!(hasher.compute_hash(&path).is_err());
    }

    #[test]
    fn missing_file_yields_error() {
        let hasher = DctHasher::new();
        assert!(hasher
            .compute_hash(Path::new("/nonexistent/photo.png"))
            .is_err());
    }
}
