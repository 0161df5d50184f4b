//! Perceptual hashing of extracted frames.

use image_hasher::{HashAlg, Hasher, HasherConfig, ImageHash};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::error::PipelineError;

/// Computes a fixed-length perceptual hash for one image file.
///
/// Called from the blocking thread pool, so implementations may do
/// synchronous I/O and CPU-heavy work.
pub trait PerceptualHasher: Send + Sync {
    /// Hash the image at `path` on a `bits` x `bits` grid.
    fn hash_file(&self, path: &Path, bits: u32) -> Result<String, PipelineError>;
}

/// Blockhash perceptual hasher built on `image_hasher`.
///
/// Hashes are rendered as base64 and are the same length for every frame
/// hashed with the same `bits`. One configured `image_hasher::Hasher` is
/// kept per grid size.
#[derive(Default)]
pub struct BlockhashHasher {
    hashers: RwLock<HashMap<u32, Arc<Hasher>>>,
}

impl BlockhashHasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// The configured hasher for a `bits` x `bits` grid.
    fn hasher(&self, bits: u32) -> Arc<Hasher> {
        let cached = self
            .hashers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&bits)
            .cloned();
        if let Some(hasher) = cached {
            return hasher;
        }

        let mut hashers = self
            .hashers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(hashers.entry(bits).or_insert_with(|| {
            tracing::trace!("Building {bits}x{bits} blockhash hasher");
            Arc::new(
                HasherConfig::new()
                    .hash_alg(HashAlg::Blockhash)
                    .hash_size(bits, bits)
                    .to_hasher(),
            )
        }))
    }

    /// Hash an already-decoded image.
    pub fn hash_image(&self, image: &image::DynamicImage, bits: u32) -> String {
        self.hasher(bits).hash_image(image).to_base64()
    }

    /// Compare two perceptual hashes and return their Hamming distance.
    ///
    /// Returns `None` if either hash is invalid or they differ in length.
    /// A distance of 0 means the frames are perceptually identical.
    pub fn perceptual_distance(hash1: &str, hash2: &str) -> Option<u32> {
        let h1 = ImageHash::<Vec<u8>>::from_base64(hash1).ok()?;
        let h2 = ImageHash::<Vec<u8>>::from_base64(hash2).ok()?;
        if h1.as_bytes().len() != h2.as_bytes().len() {
            return None;
        }
        Some(h1.dist(&h2))
    }
}

impl std::fmt::Debug for BlockhashHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sizes: Vec<u32> = self
            .hashers
            .read()
            .map(|hashers| hashers.keys().copied().collect())
            .unwrap_or_default();
        sizes.sort_unstable();
        f.debug_struct("BlockhashHasher")
            .field("sizes", &sizes)
            .finish()
    }
}

impl PerceptualHasher for BlockhashHasher {
    fn hash_file(&self, path: &Path, bits: u32) -> Result<String, PipelineError> {
        let image = image::open(path).map_err(|e| PipelineError::Hashing {
            frame: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(self.hash_image(&image, bits))
    }
}
