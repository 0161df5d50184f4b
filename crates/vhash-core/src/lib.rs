//! vhash Core - perceptual fingerprints for near-duplicate video detection.
//!
//! A video is sampled at evenly spaced timestamps (how many depends on its
//! duration and the configured strength), every sampled frame is
//! perceptually hashed, and the ordered frame hashes are folded into one
//! digest.
//!
//! # Architecture
//!
//! ```text
//! Video → Probe (cached) → Schedule → Workspace → Extract → Hash frames → Digest
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use vhash_core::{Config, VideoHash};
//!
//! #[tokio::main]
//! async fn main() -> vhash_core::Result<()> {
//!     let vhash = VideoHash::new(Config::load()?)?;
//!     let video = vhash.video("./clip.mp4")?;
//!
//!     println!("{}", video.hash().await?);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod video;

// Re-exports for convenient access
pub use config::{Config, Options};
pub use error::{ConfigError, PipelineError, PipelineResult, Result, VhashError};
pub use output::{ComparisonRecord, FingerprintRecord, OutputFormat, OutputWriter};
pub use pipeline::{screenshot_count, DigestAlgorithm, Metadata, SampleSchedule};
pub use video::{Fingerprint, Toolchain, Video};

use std::path::Path;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point: holds configuration and hands out [`Video`] sessions.
pub struct VideoHash {
    config: Config,
    options: Options,
    toolchain: Toolchain,
}

impl VideoHash {
    /// Create a new instance with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        tracing::debug!("Initializing vhash v{}", VERSION);
        let toolchain = Toolchain::from_config(&config);
        Ok(Self::with_toolchain(config, toolchain))
    }

    /// Create a new instance with default configuration.
    pub fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Self::new(config)
    }

    /// Create an instance with explicit collaborators.
    pub fn with_toolchain(config: Config, toolchain: Toolchain) -> Self {
        let options = config.options();
        Self {
            config,
            options,
            toolchain,
        }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Options handed to new sessions.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Change the options handed to sessions created from now on.
    ///
    /// Tool paths are fixed at construction and not part of [`Options`].
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Prepare the video at `path` for hashing.
    ///
    /// Fails only for an empty path; whether the file is a readable video is
    /// discovered by the first `metadata()` or `hash()` call.
    pub fn video(&self, path: impl AsRef<Path>) -> PipelineResult<Video> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(PipelineError::InvalidArgument(
                "You must provide a path to a video.".to_string(),
            ));
        }
        Ok(Video::with_toolchain(
            self.options.clone(),
            Some(path.to_path_buf()),
            self.toolchain.clone(),
        ))
    }
}

impl std::fmt::Debug for VideoHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoHash")
            .field("options", &self.options)
            .field("parallel_workers", &self.toolchain.parallel_workers)
            .finish_non_exhaustive()
    }
}
