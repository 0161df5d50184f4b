//! Command implementations.

pub mod compare;
pub mod config;
pub mod hash;
pub mod probe;

use clap::Args;
use std::path::PathBuf;
use vhash_core::{Config, VideoHash};

/// Hashing overrides shared by `hash` and `compare`.
#[derive(Args, Debug, Default, Clone)]
pub struct HashingOverrides {
    /// Screenshots per second of video (0.1 to 10)
    #[arg(short, long)]
    pub strength: Option<f64>,

    /// Perceptual hash grid size per frame (2 to 64)
    #[arg(short, long)]
    pub bits: Option<u32>,

    /// Digest algorithm (sha224, sha256, sha384, sha512, blake3)
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// Base directory for temporary frame workspaces
    #[arg(long, env = "VHASH_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,
}

impl HashingOverrides {
    /// Apply the overrides onto `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(strength) = self.strength {
            config.hashing.strength = strength;
        }
        if let Some(bits) = self.bits {
            config.hashing.bits = bits;
        }
        if let Some(algorithm) = &self.algorithm {
            config.hashing.algorithm = algorithm.clone();
        }
        if let Some(temp_dir) = &self.temp_dir {
            config.workspace.temp_dir = temp_dir.to_string_lossy().into_owned();
        }
    }
}

/// Build a validated [`VideoHash`] from config plus command-line overrides.
pub fn build_vhash(mut config: Config, overrides: &HashingOverrides) -> anyhow::Result<VideoHash> {
    overrides.apply(&mut config);
    Ok(VideoHash::new(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_only_given_values() {
        let overrides = HashingOverrides {
            strength: Some(4.0),
            algorithm: Some("blake3".to_string()),
            ..Default::default()
        };
        let mut config = Config::default();
        overrides.apply(&mut config);

        assert_eq!(config.hashing.strength, 4.0);
        assert_eq!(config.hashing.algorithm, "blake3");
        assert_eq!(config.hashing.bits, 12);
    }

    #[test]
    fn test_build_rejects_out_of_range_strength() {
        let overrides = HashingOverrides {
            strength: Some(20.0),
            ..Default::default()
        };
        let err = build_vhash(Config::default(), &overrides).unwrap_err();
        assert!(err.to_string().contains("strength"));
    }

    #[test]
    fn test_build_applies_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = HashingOverrides {
            temp_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let vhash = build_vhash(Config::default(), &overrides).unwrap();
        assert_eq!(vhash.options().temp_dir, dir.path().to_path_buf());
    }
}
