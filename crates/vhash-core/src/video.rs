//! A hashing session bound to one video source.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, OnceCell};

use crate::config::{Config, Options};
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::{
    CaptureHashPipeline, DigestAlgorithm, FfmpegExtractor, FfprobeProber, FrameExtractor,
    BlockhashHasher, Metadata, PerceptualHasher, SampleSchedule, VideoProber, Workspace,
};

/// The external collaborators a session delegates to.
#[derive(Clone)]
pub struct Toolchain {
    /// Metadata probe
    pub prober: Arc<dyn VideoProber>,
    /// Frame extractor
    pub extractor: Arc<dyn FrameExtractor>,
    /// Per-frame perceptual hasher
    pub hasher: Arc<dyn PerceptualHasher>,
    /// Max extractions / frame hashes in flight per run
    pub parallel_workers: usize,
}

impl Toolchain {
    /// ffprobe + ffmpeg + blockhash, as configured.
    pub fn from_config(config: &Config) -> Self {
        let workers = config.processing.parallel_workers;
        Self {
            prober: Arc::new(FfprobeProber::new(&config.tools.ffprobe_path)),
            extractor: Arc::new(FfmpegExtractor::new(&config.tools.ffmpeg_path, workers)),
            hasher: Arc::new(BlockhashHasher::new()),
            parallel_workers: workers,
        }
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The result of fingerprinting one video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fingerprint {
    /// Video source the fingerprint was computed from
    pub source: PathBuf,
    /// Hex digest over the ordered capture hashes
    pub digest: String,
    /// Digest algorithm
    pub algorithm: DigestAlgorithm,
    /// Perceptual hash grid size per frame
    pub hash_bits: u32,
    /// Sampling strength
    pub strength: f64,
    /// Video duration in seconds
    pub duration: f64,
    /// Number of frames sampled
    pub screenshot_count: usize,
    /// Per-frame perceptual hashes, in timestamp order
    pub capture_hashes: Vec<String>,
}

impl Fingerprint {
    /// Mean Hamming distance between corresponding frame hashes.
    ///
    /// `None` if the fingerprints sampled a different number of frames or a
    /// frame hash cannot be decoded. 0.0 means every sampled frame matched.
    pub fn frame_distance(&self, other: &Fingerprint) -> Option<f64> {
        if self.capture_hashes.len() != other.capture_hashes.len()
            || self.capture_hashes.is_empty()
        {
            return None;
        }
        let total = self
            .capture_hashes
            .iter()
            .zip(&other.capture_hashes)
            .map(|(a, b)| BlockhashHasher::perceptual_distance(a, b))
            .sum::<Option<u32>>()?;
        Some(f64::from(total) / self.capture_hashes.len() as f64)
    }
}

/// A hashing session for one video.
///
/// Metadata is probed at most once per session and shared by every caller.
/// Options are read at call time, so changing them between `metadata()` and
/// `hash()` affects the next hash; the last fingerprint is cached together
/// with the options it was computed under.
pub struct Video {
    source: Option<PathBuf>,
    options: RwLock<Options>,
    prober: Arc<dyn VideoProber>,
    pipeline: CaptureHashPipeline,
    metadata: OnceCell<Arc<Metadata>>,
    fingerprint: Mutex<Option<(Options, Arc<Fingerprint>)>>,
}

impl Video {
    /// Create a session using the default ffprobe/ffmpeg toolchain.
    ///
    /// A session without a source is valid; its operations fail with
    /// [`PipelineError::NoVideo`].
    pub fn new(options: Options, source: Option<PathBuf>) -> Self {
        Self::with_toolchain(options, source, Toolchain::default())
    }

    /// Create a session with explicit collaborators.
    pub fn with_toolchain(options: Options, source: Option<PathBuf>, toolchain: Toolchain) -> Self {
        Self {
            source,
            options: RwLock::new(options),
            prober: toolchain.prober,
            pipeline: CaptureHashPipeline::new(
                toolchain.extractor,
                toolchain.hasher,
                toolchain.parallel_workers,
            ),
            metadata: OnceCell::new(),
            fingerprint: Mutex::new(None),
        }
    }

    /// The bound video source, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Snapshot of the current options.
    pub fn options(&self) -> Options {
        self.options
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the options used by subsequent calls.
    pub fn set_options(&self, options: Options) {
        *self
            .options
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = options;
    }

    /// Duration and stream metadata, probed once and cached.
    ///
    /// Concurrent first calls share a single probe. A failed probe is not
    /// cached.
    pub async fn metadata(&self) -> PipelineResult<Arc<Metadata>> {
        let source = self.require_source()?;
        let metadata = self
            .metadata
            .get_or_try_init(|| async {
                tracing::debug!("Probing {:?}", source);
                self.prober.probe(source).await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(metadata))
    }

    /// The video fingerprint digest.
    pub async fn hash(&self) -> PipelineResult<String> {
        Ok(self.fingerprint().await?.digest.clone())
    }

    /// Full fingerprint, including per-frame hashes.
    ///
    /// Repeated calls with unchanged options return the cached result;
    /// concurrent calls on one session wait for the run in progress.
    pub async fn fingerprint(&self) -> PipelineResult<Arc<Fingerprint>> {
        let source = self.require_source()?;
        let options = self.options();
        validate_options(&options)?;
        let algorithm = DigestAlgorithm::parse(&options.hash_algorithm)?;

        let mut cached = self.fingerprint.lock().await;
        if let Some((cached_options, fingerprint)) = cached.as_ref() {
            if *cached_options == options {
                tracing::trace!("Fingerprint cache hit for {:?}", source);
                return Ok(Arc::clone(fingerprint));
            }
        }

        let start = std::time::Instant::now();
        let metadata = self.metadata().await?;
        let schedule = SampleSchedule::new(metadata.duration, options.strength);
        tracing::debug!(
            "Sampling {} frames from {:?} ({:.3}s at strength {})",
            schedule.len(),
            source,
            metadata.duration,
            options.strength
        );

        let workspace = Workspace::acquire(&options.temp_dir)?;
        let capture_hashes = self
            .pipeline
            .run(source, &schedule, &workspace, options.hash_bits)
            .await?;
        if let Err(e) = workspace.release() {
            tracing::warn!("Failed to remove workspace for {:?}: {}", source, e);
        }

        let fingerprint = Arc::new(Fingerprint {
            source: source.to_path_buf(),
            digest: algorithm.fold(&capture_hashes),
            algorithm,
            hash_bits: options.hash_bits,
            strength: options.strength,
            duration: metadata.duration,
            screenshot_count: capture_hashes.len(),
            capture_hashes,
        });
        tracing::debug!(
            "Fingerprinted {:?} in {:?}: {}",
            source,
            start.elapsed(),
            fingerprint.digest
        );

        *cached = Some((options, Arc::clone(&fingerprint)));
        Ok(fingerprint)
    }

    fn require_source(&self) -> PipelineResult<&Path> {
        self.source.as_deref().ok_or(PipelineError::NoVideo)
    }
}

impl std::fmt::Debug for Video {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Video")
            .field("source", &self.source)
            .field("options", &self.options())
            .field("metadata", &self.metadata.get())
            .finish_non_exhaustive()
    }
}

fn validate_options(options: &Options) -> PipelineResult<()> {
    use crate::config::{MAX_HASH_BITS, MAX_STRENGTH, MIN_HASH_BITS, MIN_STRENGTH};

    if !(MIN_STRENGTH..=MAX_STRENGTH).contains(&options.strength) {
        return Err(PipelineError::InvalidArgument(format!(
            "strength must be between {MIN_STRENGTH} and {MAX_STRENGTH}, got {}",
            options.strength
        )));
    }
    if !(MIN_HASH_BITS..=MAX_HASH_BITS).contains(&options.hash_bits) {
        return Err(PipelineError::InvalidArgument(format!(
            "hash_bits must be between {MIN_HASH_BITS} and {MAX_HASH_BITS}, got {}",
            options.hash_bits
        )));
    }
    Ok(())
}
