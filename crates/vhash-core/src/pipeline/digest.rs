//! Folding ordered per-frame hashes into one video digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// Cryptographic digest used for the video-level fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Blake3,
}

impl DigestAlgorithm {
    /// Parse an algorithm name (case-insensitive, dashes ignored: "SHA-256").
    pub fn parse(name: &str) -> Result<Self, PipelineError> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "");
        match normalized.as_str() {
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            "blake3" => Ok(Self::Blake3),
            _ => Err(PipelineError::UnsupportedAlgorithm(name.to_string())),
        }
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Blake3 => "blake3",
        }
    }

    /// Lowercase hex digest of `payload`.
    pub fn digest(self, payload: &[u8]) -> String {
        match self {
            Self::Sha224 => format!("{:x}", Sha224::digest(payload)),
            Self::Sha256 => format!("{:x}", Sha256::digest(payload)),
            Self::Sha384 => format!("{:x}", Sha384::digest(payload)),
            Self::Sha512 => format!("{:x}", Sha512::digest(payload)),
            Self::Blake3 => blake3::hash(payload).to_hex().to_string(),
        }
    }

    /// Fold ordered capture hashes into the video fingerprint.
    ///
    /// The hashes are concatenated in order before digesting, so permuting
    /// frames changes the result.
    pub fn fold<S: AsRef<str>>(self, capture_hashes: &[S]) -> String {
        let joined: String = capture_hashes.iter().map(AsRef::as_ref).collect();
        self.digest(joined.as_bytes())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(DigestAlgorithm::parse("sha256").unwrap(), DigestAlgorithm::Sha256);
        assert_eq!(DigestAlgorithm::parse("SHA-512").unwrap(), DigestAlgorithm::Sha512);
        assert_eq!("blake3".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Blake3);
        assert!(matches!(
            DigestAlgorithm::parse("md5"),
            Err(PipelineError::UnsupportedAlgorithm(name)) if name == "md5"
        ));
    }

    #[test]
    fn test_known_sha256_vector() {
        assert_eq!(
            DigestAlgorithm::Sha256.digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(DigestAlgorithm::Sha224.digest(b"x").len(), 56);
        assert_eq!(DigestAlgorithm::Sha256.digest(b"x").len(), 64);
        assert_eq!(DigestAlgorithm::Sha384.digest(b"x").len(), 96);
        assert_eq!(DigestAlgorithm::Sha512.digest(b"x").len(), 128);
        assert_eq!(DigestAlgorithm::Blake3.digest(b"x").len(), 64);
    }

    #[test]
    fn test_fold_is_deterministic_and_order_sensitive() {
        let forward = ["AAAA", "BBBB", "CCCC"];
        let reversed = ["CCCC", "BBBB", "AAAA"];
        let alg = DigestAlgorithm::Sha256;
        assert_eq!(alg.fold(&forward), alg.fold(&forward));
        assert_ne!(alg.fold(&forward), alg.fold(&reversed));
    }

    #[test]
    fn test_fold_matches_digest_of_concatenation() {
        let hashes = vec!["one".to_string(), "two".to_string()];
        assert_eq!(
            DigestAlgorithm::Blake3.fold(&hashes),
            DigestAlgorithm::Blake3.digest(b"onetwo")
        );
    }

    #[test]
    fn test_algorithm_changes_digest() {
        let hashes = ["AAAA", "BBBB"];
        assert_ne!(
            DigestAlgorithm::Sha256.fold(&hashes),
            DigestAlgorithm::Blake3.fold(&hashes)
        );
    }
}
