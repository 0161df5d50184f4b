//! Video metadata retrieval through ffprobe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::PipelineError;

/// Duration and stream information for one video source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Duration in seconds
    pub duration: f64,
    /// Container-level information
    pub format: FormatInfo,
    /// Per-stream information
    pub streams: Vec<StreamInfo>,
    /// The probe tool's raw output
    #[serde(skip_serializing_if = "serde_json::Value::is_null", default)]
    pub raw: serde_json::Value,
}

impl Metadata {
    /// The first video stream, if any.
    pub fn video_stream(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.codec_type == "video")
    }
}

/// Container-level information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Container name(s) as reported by the probe
    pub format_name: Option<String>,
    /// File size in bytes
    pub size: Option<u64>,
    /// Bitrate in bits/second
    pub bit_rate: Option<u64>,
}

/// Information about one stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    /// "video", "audio", "subtitle", ...
    pub codec_type: String,
    /// Codec short name
    pub codec_name: Option<String>,
    /// Width in pixels (video only)
    pub width: Option<u32>,
    /// Height in pixels (video only)
    pub height: Option<u32>,
    /// Frame rate in frames/second (video only)
    pub fps: Option<f64>,
    /// Stream duration in seconds
    pub duration: Option<f64>,
}

/// Retrieves [`Metadata`] for a video source.
#[async_trait]
pub trait VideoProber: Send + Sync {
    /// Probe `source`. Fails with [`PipelineError::Probe`] when the source is
    /// missing, unreadable, or not a video.
    async fn probe(&self, source: &Path) -> Result<Metadata, PipelineError>;
}

/// [`VideoProber`] backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    binary: PathBuf,
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeProber {
    /// Use the ffprobe binary at `binary` (a bare name is looked up on PATH).
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl VideoProber for FfprobeProber {
    async fn probe(&self, source: &Path) -> Result<Metadata, PipelineError> {
        let fail = |message: String| PipelineError::Probe {
            path: source.to_path_buf(),
            message,
        };

        if !source.exists() {
            return Err(fail("File not found".to_string()));
        }

        let start = std::time::Instant::now();
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| fail(format!("Failed to run {}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let metadata = parse_ffprobe_json(&output.stdout).map_err(fail)?;
        tracing::debug!(
            "Probed {:?} in {:?}: {:.3}s, {} streams",
            source,
            start.elapsed(),
            metadata.duration,
            metadata.streams.len()
        );
        Ok(metadata)
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

/// Parse ffprobe's `-print_format json` output.
///
/// Duration comes from the container, falling back to the longest stream.
/// Output without a positive duration is not a usable video.
fn parse_ffprobe_json(bytes: &[u8]) -> Result<Metadata, String> {
    let raw: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| format!("Invalid ffprobe output: {e}"))?;
    let probe: FfprobeOutput = serde_json::from_value(raw.clone())
        .map_err(|e| format!("Unexpected ffprobe output: {e}"))?;

    let streams: Vec<StreamInfo> = probe
        .streams
        .iter()
        .map(|s| StreamInfo {
            codec_type: s.codec_type.clone(),
            codec_name: s.codec_name.clone(),
            width: s.width,
            height: s.height,
            fps: s
                .avg_frame_rate
                .as_deref()
                .and_then(parse_frame_rate)
                .or_else(|| s.r_frame_rate.as_deref().and_then(parse_frame_rate)),
            duration: s.duration.as_deref().and_then(|d| d.parse().ok()),
        })
        .collect();

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            streams
                .iter()
                .filter_map(|s| s.duration)
                .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.max(d))))
        })
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| "No duration reported".to_string())?;

    Ok(Metadata {
        duration,
        format: FormatInfo {
            format_name: probe.format.format_name,
            size: probe.format.size.as_deref().and_then(|s| s.parse().ok()),
            bit_rate: probe.format.bit_rate.as_deref().and_then(|b| b.parse().ok()),
        },
        streams,
        raw,
    })
}

/// Parse a frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        return (den > 0.0).then(|| num / den);
    }
    s.parse().ok()
}
