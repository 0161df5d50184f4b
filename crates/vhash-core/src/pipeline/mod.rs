//! Video fingerprinting pipeline components.
//!
//! This module contains all the stages of the pipeline:
//! - **probe**: Retrieve duration and stream metadata
//! - **schedule**: Decide how many frames to sample and where
//! - **workspace**: Per-run temporary directory for extracted frames
//! - **extract**: Write one image per scheduled timestamp
//! - **hash**: Perceptual hash of a single frame
//! - **capture**: Orchestrates extraction and per-frame hashing
//! - **digest**: Folds ordered frame hashes into the video digest

pub mod capture;
pub mod digest;
pub mod extract;
pub mod hash;
pub mod probe;
pub mod schedule;
pub mod workspace;

// Re-exports for convenient access
pub use capture::CaptureHashPipeline;
pub use digest::DigestAlgorithm;
pub use extract::{FfmpegExtractor, FrameExtractor};
pub use hash::{BlockhashHasher, PerceptualHasher};
pub use probe::{FfprobeProber, FormatInfo, Metadata, StreamInfo, VideoProber};
pub use schedule::{screenshot_count, SampleSchedule};
pub use workspace::Workspace;
