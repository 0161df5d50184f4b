//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::pipeline::digest::DigestAlgorithm;

use super::Config;

/// Lowest accepted strength.
pub const MIN_STRENGTH: f64 = 0.1;
/// Highest accepted strength.
pub const MAX_STRENGTH: f64 = 10.0;
/// Smallest accepted perceptual hash grid size.
pub const MIN_HASH_BITS: u32 = 2;
/// Largest accepted perceptual hash grid size.
pub const MAX_HASH_BITS: u32 = 64;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let strength = self.hashing.strength;
        if !(MIN_STRENGTH..=MAX_STRENGTH).contains(&strength) {
            return Err(ConfigError::ValidationError(format!(
                "hashing.strength must be between {MIN_STRENGTH} and {MAX_STRENGTH}, got {strength}"
            )));
        }
        let bits = self.hashing.bits;
        if !(MIN_HASH_BITS..=MAX_HASH_BITS).contains(&bits) {
            return Err(ConfigError::ValidationError(format!(
                "hashing.bits must be between {MIN_HASH_BITS} and {MAX_HASH_BITS}, got {bits}"
            )));
        }
        if DigestAlgorithm::parse(&self.hashing.algorithm).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "hashing.algorithm '{}' is not supported",
                self.hashing.algorithm
            )));
        }
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.tools.ffmpeg_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "tools.ffmpeg_path must not be empty".into(),
            ));
        }
        if self.tools.ffprobe_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "tools.ffprobe_path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_strength_bounds() {
        let mut config = Config::default();
        config.hashing.strength = 0.1;
        assert!(config.validate().is_ok());
        config.hashing.strength = 10.0;
        assert!(config.validate().is_ok());

        config.hashing.strength = 0.05;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("hashing.strength"));

        config.hashing.strength = 10.5;
        assert!(config.validate().is_err());

        config.hashing.strength = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_hash_bits() {
        let mut config = Config::default();
        config.hashing.bits = 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("hashing.bits"));
    }

    #[test]
    fn test_validate_hash_bits_upper_bound() {
        let mut config = Config::default();
        config.hashing.bits = MAX_HASH_BITS;
        assert!(config.validate().is_ok());

        config.hashing.bits = 100_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("between 2 and 64"));
    }

    #[test]
    fn test_validate_rejects_unknown_algorithm() {
        let mut config = Config::default();
        config.hashing.algorithm = "md4".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("md4"));
    }

    #[test]
    fn test_validate_rejects_zero_parallel_workers() {
        let mut config = Config::default();
        config.processing.parallel_workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parallel_workers"));
    }

    #[test]
    fn test_validate_rejects_empty_tool_path() {
        let mut config = Config::default();
        config.tools.ffprobe_path = PathBuf::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ffprobe_path"));
    }
}
