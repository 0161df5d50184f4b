//! Frame extraction through ffmpeg.

use async_trait::async_trait;
use futures_util::{stream, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::workspace::frame_file_name;
use crate::error::PipelineError;

/// Image format frames are written in.
pub const FRAME_EXTENSION: &str = "png";

/// Writes one image per timestamp into a destination directory.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Extract a frame at each of `timestamps` (seconds) from `source` into
    /// `dest_dir`.
    ///
    /// Returns the produced files in timestamp order. A timestamp that yields
    /// no image is simply absent from the result; the caller checks the count.
    async fn extract(
        &self,
        source: &Path,
        timestamps: &[f64],
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, PipelineError>;
}

/// [`FrameExtractor`] that runs one `ffmpeg` seek-and-grab per timestamp.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    binary: PathBuf,
    parallel: usize,
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new("ffmpeg", 4)
    }
}

impl FfmpegExtractor {
    /// Use the ffmpeg binary at `binary`, running at most `parallel` at once.
    pub fn new(binary: impl Into<PathBuf>, parallel: usize) -> Self {
        Self {
            binary: binary.into(),
            parallel: parallel.max(1),
        }
    }

    async fn grab(
        &self,
        source: &Path,
        timestamp: f64,
        output: PathBuf,
    ) -> Result<Option<PathBuf>, PipelineError> {
        let fail = |message: String| PipelineError::Extraction {
            path: source.to_path_buf(),
            message,
        };

        let result = Command::new(&self.binary)
            .args(["-v", "error", "-nostdin", "-y", "-ss"])
            .arg(format!("{timestamp:.3}"))
            .arg("-i")
            .arg(source)
            .args(["-frames:v", "1", "-an"])
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| fail(format!("Failed to run {}: {}", self.binary.display(), e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(fail(format!(
                "ffmpeg exited with {} at {:.3}s: {}",
                result.status,
                timestamp,
                stderr.trim()
            )));
        }

        if output.is_file() {
            tracing::trace!("Captured {:.3}s -> {:?}", timestamp, output);
            Ok(Some(output))
        } else {
            tracing::warn!("ffmpeg produced no frame at {:.3}s for {:?}", timestamp, source);
            Ok(None)
        }
    }
}

#[async_trait]
impl FrameExtractor for FfmpegExtractor {
    async fn extract(
        &self,
        source: &Path,
        timestamps: &[f64],
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        let grabbed: Vec<Option<PathBuf>> = stream::iter(timestamps.iter().copied().enumerate())
            .map(move |(index, timestamp)| {
                let output = dest_dir.join(frame_file_name(index, FRAME_EXTENSION));
                self.grab(source, timestamp, output)
            })
            .buffered(self.parallel)
            .try_collect()
            .await?;

        Ok(grabbed.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::hash::tests::split_image;
    use crate::pipeline::{BlockhashHasher, CaptureHashPipeline, SampleSchedule, Workspace};
    use std::sync::Arc;

    #[test]
    fn test_parallelism_is_at_least_one() {
        let extractor = FfmpegExtractor::new("ffmpeg", 0);
        assert_eq!(extractor.parallel, 1);
    }

    #[tokio::test]
    async fn test_missing_binary_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FfmpegExtractor::new(dir.path().join("no-such-ffmpeg"), 2);
        let err = extractor
            .extract(Path::new("clip.mp4"), &[1.0, 2.0], dir.path())
            .await
            .unwrap_err();
        match err {
            PipelineError::Extraction { path, message } => {
                assert_eq!(path, PathBuf::from("clip.mp4"));
                assert!(message.contains("Failed to run"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Writes a stand-in `ffmpeg` that copies a test card to its output path,
    /// except at the `-ss` value `skip` where it exits 0 without writing.
    #[cfg(unix)]
    fn stand_in_ffmpeg(dir: &Path, skip: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let card = dir.join("card.png");
        split_image(true).save(&card).unwrap();

        let script = dir.join("ffmpeg");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\n\
                 prev=''\n\
                 for arg; do\n  \
                   if [ \"$prev\" = \"-ss\" ]; then ts=\"$arg\"; fi\n  \
                   prev=\"$arg\"\n\
                 done\n\
                 [ \"$ts\" = \"{skip}\" ] && exit 0\n\
                 [ \"$ts\" = \"1.000\" ] && sleep 0.2\n\
                 cp '{}' \"$prev\"\n",
                card.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_frames_named_and_ordered_by_timestamp() {
        let tools = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let extractor = FfmpegExtractor::new(stand_in_ffmpeg(tools.path(), "none"), 4);

        let frames = extractor
            .extract(Path::new("clip.mp4"), &[1.0, 2.0, 3.0, 4.0], out.path())
            .await
            .unwrap();

        let names: Vec<String> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            ["shot_00001.png", "shot_00002.png", "shot_00003.png", "shot_00004.png"]
        );
        assert!(frames.iter().all(|p| p.starts_with(out.path()) && p.is_file()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_grab_without_output_is_dropped() {
        let tools = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let extractor = FfmpegExtractor::new(stand_in_ffmpeg(tools.path(), "2.000"), 2);

        let frames = extractor
            .extract(Path::new("clip.mp4"), &[1.0, 2.0, 3.0], out.path())
            .await
            .unwrap();

        assert_eq!(
            frames,
            vec![out.path().join("shot_00001.png"), out.path().join("shot_00003.png")]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_frame_fails_capture_run() {
        let tools = tempfile::tempdir().unwrap();
        let base = tempfile::tempdir().unwrap();
        let workspace = Workspace::acquire(base.path()).unwrap();
        let schedule = SampleSchedule::new(4.0, 1.0);
        let pipeline = CaptureHashPipeline::new(
            Arc::new(FfmpegExtractor::new(stand_in_ffmpeg(tools.path(), "1.600"), 2)),
            Arc::new(BlockhashHasher::new()),
            2,
        );

        let err = pipeline
            .run(Path::new("clip.mp4"), &schedule, &workspace, 12)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ExtractionCountMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_no_timestamps_extracts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FfmpegExtractor::new(dir.path().join("no-such-ffmpeg"), 2);
        let frames = extractor
            .extract(Path::new("clip.mp4"), &[], dir.path())
            .await
            .unwrap();
        assert!(frames.is_empty());
    }
}
