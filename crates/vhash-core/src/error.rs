//! Error types for the video fingerprinting pipeline.
//!
//! Errors are organized by stage so that a failed run says where it stopped
//! (probe, workspace, extraction, hashing) and which file was involved.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for vhash operations.
#[derive(Error, Debug)]
pub enum VhashError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
///
/// Every stage fails fast. A run that returns one of these produced no
/// fingerprint at all; there is no partial result to recover.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The session has no video bound to it.
    ///
    /// The message is kept verbatim for compatibility with existing callers.
    #[error("Video was not provided.")]
    NoVideo,

    /// A caller-supplied argument was rejected
    #[error("{0}")]
    InvalidArgument(String),

    /// Metadata retrieval failed (missing, corrupt, or unsupported source)
    #[error("Probe failed for {path}: {message}")]
    Probe { path: PathBuf, message: String },

    /// The temporary workspace could not be created or used
    #[error("Workspace unusable at {path}: {message}")]
    Workspace { path: PathBuf, message: String },

    /// The frame extractor failed outright
    #[error("Frame extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    /// The extractor produced a different number of frames than scheduled
    #[error("Expected {expected} extracted frames, got {actual}")]
    ExtractionCountMismatch { expected: usize, actual: usize },

    /// Perceptual hashing of one frame failed
    #[error("Perceptual hash failed for frame {frame}: {message}")]
    Hashing { frame: PathBuf, message: String },

    /// The configured digest algorithm is not available
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Convenience type alias for vhash results.
pub type Result<T> = std::result::Result<T, VhashError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_video_message_is_exact() {
        assert_eq!(PipelineError::NoVideo.to_string(), "Video was not provided.");
        let top: VhashError = PipelineError::NoVideo.into();
        assert_eq!(top.to_string(), "Video was not provided.");
    }

    #[test]
    fn test_count_mismatch_message() {
        let err = PipelineError::ExtractionCountMismatch {
            expected: 34,
            actual: 33,
        };
        assert_eq!(err.to_string(), "Expected 34 extracted frames, got 33");
    }
}
