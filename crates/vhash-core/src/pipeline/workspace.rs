//! Per-run temporary workspace for extracted frames.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::TempDir;

use crate::error::PipelineError;

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "vhash_";

/// An exclusively owned temporary directory, removed on drop.
///
/// Names follow `vhash_<unix-millis>_<random>`. The directory is created with
/// exclusive semantics, so two runs can never end up sharing one even when
/// they start in the same millisecond.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace under `base_dir` and check it is writable.
    pub fn acquire(base_dir: &Path) -> Result<Self, PipelineError> {
        let unusable = |message: String| PipelineError::Workspace {
            path: base_dir.to_path_buf(),
            message,
        };

        let meta = std::fs::metadata(base_dir)
            .map_err(|e| unusable(format!("Cannot access base directory: {e}")))?;
        if !meta.is_dir() {
            return Err(unusable("Base path is not a directory".to_string()));
        }

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let dir = tempfile::Builder::new()
            .prefix(&format!("{WORKSPACE_PREFIX}{millis}_"))
            .rand_bytes(8)
            .tempdir_in(base_dir)
            .map_err(|e| unusable(format!("Cannot create workspace: {e}")))?;

        let path = dir.path().to_path_buf();
        let probe = path.join(".writable");
        std::fs::write(&probe, b"")
            .and_then(|()| std::fs::remove_file(&probe))
            .map_err(|e| PipelineError::Workspace {
                path: path.clone(),
                message: format!("Workspace is not writable: {e}"),
            })?;

        tracing::debug!("Acquired workspace {:?}", path);
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File path for the frame at `index`, zero-padded so lexical order
    /// matches schedule order.
    pub fn frame_path(&self, index: usize, extension: &str) -> PathBuf {
        self.path.join(frame_file_name(index, extension))
    }

    /// Remove the workspace now, reporting any failure.
    pub fn release(mut self) -> std::io::Result<()> {
        match self.dir.take() {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                tracing::warn!("Failed to remove workspace {:?}: {}", self.path, e);
            }
        }
    }
}

/// Zero-padded, 1-based frame file name (`shot_00001.png`).
pub fn frame_file_name(index: usize, extension: &str) -> String {
    format!("shot_{:05}.{}", index + 1, extension)
}
