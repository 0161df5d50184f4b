//! Extract scheduled frames and perceptually hash each one, in order.

use futures_util::{stream, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::extract::FrameExtractor;
use super::hash::PerceptualHasher;
use super::schedule::SampleSchedule;
use super::workspace::Workspace;
use crate::error::PipelineError;

/// Runs extraction followed by per-frame perceptual hashing.
///
/// Hashing runs on the blocking pool with at most `parallel` frames in
/// flight; results always come back in schedule order. Any failure aborts
/// the whole run.
#[derive(Clone)]
pub struct CaptureHashPipeline {
    extractor: Arc<dyn FrameExtractor>,
    hasher: Arc<dyn PerceptualHasher>,
    parallel: usize,
}

impl CaptureHashPipeline {
    /// Create a pipeline over the given collaborators.
    pub fn new(
        extractor: Arc<dyn FrameExtractor>,
        hasher: Arc<dyn PerceptualHasher>,
        parallel: usize,
    ) -> Self {
        Self {
            extractor,
            hasher,
            parallel: parallel.max(1),
        }
    }

    /// Extract every scheduled frame of `source` into `workspace` and hash it.
    ///
    /// Returns exactly `schedule.len()` hashes in timestamp order.
    pub async fn run(
        &self,
        source: &Path,
        schedule: &SampleSchedule,
        workspace: &Workspace,
        hash_bits: u32,
    ) -> Result<Vec<String>, PipelineError> {
        let extract_start = std::time::Instant::now();
        let frames = self
            .extractor
            .extract(source, schedule.timestamps(), workspace.path())
            .await?;
        if frames.len() != schedule.len() {
            return Err(PipelineError::ExtractionCountMismatch {
                expected: schedule.len(),
                actual: frames.len(),
            });
        }
        tracing::debug!(
            "Extracted {} frames from {:?} in {:?}",
            frames.len(),
            source,
            extract_start.elapsed()
        );

        let hash_start = std::time::Instant::now();
        let hashes = self.hash_frames(&frames, hash_bits).await?;
        tracing::debug!("Hashed {} frames in {:?}", hashes.len(), hash_start.elapsed());

        Ok(hashes)
    }

    /// Perceptually hash already-extracted frames, preserving their order.
    pub async fn hash_frames(
        &self,
        frames: &[PathBuf],
        hash_bits: u32,
    ) -> Result<Vec<String>, PipelineError> {
        stream::iter(frames.iter().cloned())
            .map(|frame| {
                let hasher = Arc::clone(&self.hasher);
                async move {
                    let task_frame = frame.clone();
                    tokio::task::spawn_blocking(move || hasher.hash_file(&task_frame, hash_bits))
                        .await
                        .map_err(|e| PipelineError::Hashing {
                            frame,
                            message: format!("Task join error: {e}"),
                        })?
                }
            })
            .buffered(self.parallel)
            .try_collect()
            .await
    }
}

impl std::fmt::Debug for CaptureHashPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureHashPipeline")
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}
