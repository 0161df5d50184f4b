//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fingerprint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Digest used to fold per-frame hashes ("sha256", "sha512", "blake3", ...)
    pub algorithm: String,

    /// Perceptual hash grid size per frame (bits x bits)
    pub bits: u32,

    /// Screenshots taken per second of video (0.1 to 10)
    pub strength: f64,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            algorithm: "sha256".to_string(),
            bits: 12,
            strength: 2.0,
        }
    }
}

/// Temporary workspace settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Base directory for per-run frame workspaces.
    /// Empty means the system temp directory.
    pub temp_dir: String,
}

/// External tool locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: PathBuf,

    /// Path or name of the ffprobe binary
    pub ffprobe_path: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Max extraction subprocesses and frame hashes in flight per run
    pub parallel_workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
