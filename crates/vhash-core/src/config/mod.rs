//! Configuration management for vhash.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. The hashing pipeline never sees `Config` directly: it receives an
//! [`Options`] snapshot taken at call time.

mod types;
mod validate;

pub use types::*;
pub use validate::{MAX_HASH_BITS, MAX_STRENGTH, MIN_HASH_BITS, MIN_STRENGTH};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for vhash.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fingerprint settings
    pub hashing: HashingConfig,

    /// Temporary workspace settings
    pub workspace: WorkspaceConfig,

    /// External tool locations
    pub tools: ToolsConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// The per-call option snapshot consumed by the pipeline.
///
/// Cloned into every stage; nothing in the pipeline mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Digest algorithm name used to fold the per-frame hashes
    pub hash_algorithm: String,
    /// Base directory for per-run workspaces
    pub temp_dir: PathBuf,
    /// Perceptual hash grid size per frame
    pub hash_bits: u32,
    /// Screenshots per second of video
    pub strength: f64,
}

impl Default for Options {
    fn default() -> Self {
        Config::default().options()
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.vhash.vhash/config.toml
    /// - Linux: ~/.config/vhash/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\vhash\config\config.toml
    ///
    /// Falls back to ~/.vhash/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "vhash", "vhash")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".vhash").join("config.toml")
            })
    }

    /// Get the resolved workspace base directory (with ~ expansion).
    pub fn temp_dir(&self) -> PathBuf {
        if self.workspace.temp_dir.trim().is_empty() {
            return std::env::temp_dir();
        }
        let expanded = shellexpand::tilde(&self.workspace.temp_dir);
        PathBuf::from(expanded.into_owned())
    }

    /// Snapshot the options the pipeline runs with.
    pub fn options(&self) -> Options {
        Options {
            hash_algorithm: self.hashing.algorithm.clone(),
            temp_dir: self.temp_dir(),
            hash_bits: self.hashing.bits,
            strength: self.hashing.strength,
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
