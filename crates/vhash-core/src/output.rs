//! Output records and JSON / JSON Lines writing.

use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::pipeline::DigestAlgorithm;
use crate::video::Fingerprint;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// One fingerprinted video, as printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct FingerprintRecord {
    pub path: PathBuf,
    pub hash: String,
    pub algorithm: DigestAlgorithm,
    pub strength: f64,
    pub hash_bits: u32,
    pub duration: f64,
    pub screenshot_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_hashes: Option<Vec<String>>,
}

impl FingerprintRecord {
    /// Build a record, optionally carrying the per-frame hashes.
    pub fn from_fingerprint(fingerprint: &Fingerprint, include_frames: bool) -> Self {
        Self {
            path: fingerprint.source.clone(),
            hash: fingerprint.digest.clone(),
            algorithm: fingerprint.algorithm,
            strength: fingerprint.strength,
            hash_bits: fingerprint.hash_bits,
            duration: fingerprint.duration,
            screenshot_count: fingerprint.screenshot_count,
            capture_hashes: include_frames.then(|| fingerprint.capture_hashes.clone()),
        }
    }
}

/// Result of comparing two fingerprints.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRecord {
    pub left: PathBuf,
    pub right: PathBuf,
    /// Digests are identical
    pub identical: bool,
    /// Mean per-frame Hamming distance, when both sampled the same frame count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_distance: Option<f64>,
}

impl ComparisonRecord {
    /// Compare `left` against `right`.
    pub fn new(left: &Fingerprint, right: &Fingerprint) -> Self {
        Self {
            left: left.source.clone(),
            right: right.source.clone(),
            identical: left.digest == right.digest,
            frame_distance: left.frame_distance(right),
        }
    }
}

/// A writer that serializes items to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single item.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json if self.pretty => {
                serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
            }
            OutputFormat::Json | OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
            }
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write multiple items: a JSON array, or one line per item for JSONL.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, items)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, items).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += items.len();
            }
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(path: &str, digest: &str, frames: &[&str]) -> Fingerprint {
        Fingerprint {
            source: PathBuf::from(path),
            digest: digest.to_string(),
            algorithm: DigestAlgorithm::Sha256,
            hash_bits: 12,
            strength: 2.0,
            duration: 1.5,
            screenshot_count: frames.len(),
            capture_hashes: frames.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_record_omits_frames_by_default() {
        let fp = fingerprint("a.mp4", "abc", &["x", "y"]);
        let json = serde_json::to_string(&FingerprintRecord::from_fingerprint(&fp, false)).unwrap();
        assert!(json.contains("\"hash\":\"abc\""));
        assert!(json.contains("\"algorithm\":\"sha256\""));
        assert!(json.contains("\"screenshot_count\":2"));
        assert!(!json.contains("capture_hashes"));

        let with_frames = FingerprintRecord::from_fingerprint(&fp, true);
        assert_eq!(with_frames.capture_hashes.unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_comparison_of_identical_digests() {
        let a = fingerprint("a.mp4", "abc", &[]);
        let b = fingerprint("b.mp4", "abc", &[]);
        let record = ComparisonRecord::new(&a, &b);
        assert!(record.identical);
        assert!(record.frame_distance.is_none());
    }

    #[test]
    fn test_write_jsonl_one_line_per_item() {
        let records = vec![
            FingerprintRecord::from_fingerprint(&fingerprint("a.mp4", "1", &[]), false),
            FingerprintRecord::from_fingerprint(&fingerprint("b.mp4", "2", &[]), false),
        ];
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.write_all(&records).unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output.trim().lines().count(), 2);
    }

    #[test]
    fn test_write_all_json_array() {
        let records = vec![FingerprintRecord::from_fingerprint(
            &fingerprint("a.mp4", "1", &[]),
            false,
        )];
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_all(&records).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with('['));
        assert!(output.trim().ends_with(']'));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("ndjson"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("csv"), None);
    }
}
