//! Output directory management for the server
//!
//! Captures land in `snapshots/`, extracted text in `output/`, both
//! relative to the server root (the working directory, or the
//! `SCREEN_CAPTURE_MCP_ROOT` override). Directories are created lazily
//! and idempotently; a concurrent create never fails a request.
//!
//! User-supplied filenames are rejected unless they are bare file names.
//! The upstream protocol performs no sanitization of its own, so this is
//! the only thing standing between a crafted `filename` argument and a
//! write outside the server tree.

use std::path::{Component, Path, PathBuf};

use crate::error::{OpResult, ToolError};

/// Directory for screenshot outputs, relative to the server root
pub const SNAPSHOTS_DIR: &str = "snapshots";
/// Directory for extracted-text outputs, relative to the server root
pub const OUTPUT_DIR: &str = "output";
/// Environment override for the server root
pub const ROOT_ENV_VAR: &str = "SCREEN_CAPTURE_MCP_ROOT";

/// Resolved output directories for one server instance
#[derive(Debug, Clone)]
pub struct ServerPaths {
    snapshots_dir: PathBuf,
    output_dir:    PathBuf,
}

impl ServerPaths {
    /// Creates paths from explicit directories (tests inject temp dirs here)
    pub fn new(snapshots_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            snapshots_dir,
            output_dir,
        }
    }

    /// Creates paths rooted at the given directory
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(root.join(SNAPSHOTS_DIR), root.join(OUTPUT_DIR))
    }

    /// Resolves paths from the environment: `SCREEN_CAPTURE_MCP_ROOT` if
    /// set, otherwise relative to the working directory
    pub fn from_env() -> Self {
        match std::env::var_os(ROOT_ENV_VAR) {
            Some(root) => Self::from_root(PathBuf::from(root)),
            None => Self::new(PathBuf::from(SNAPSHOTS_DIR), PathBuf::from(OUTPUT_DIR)),
        }
    }

    pub fn snapshots_dir(&self) -> &Path {
        &self.snapshots_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path for a screenshot; rejects anything but a bare filename
    pub fn snapshot_path(&self, filename: &str) -> OpResult<PathBuf> {
        Ok(self.snapshots_dir.join(sanitize_filename(filename)?))
    }

    /// Target path for an extracted-text file; rejects anything but a bare
    /// filename
    pub fn output_path(&self, filename: &str) -> OpResult<PathBuf> {
        Ok(self.output_dir.join(sanitize_filename(filename)?))
    }

    /// Creates the snapshots directory if absent
    pub async fn ensure_snapshots(&self) -> OpResult<()> {
        ensure_dir(&self.snapshots_dir).await
    }

    /// Creates the output directory if absent
    pub async fn ensure_output(&self) -> OpResult<()> {
        ensure_dir(&self.output_dir).await
    }
}

/// Creates a directory and its parents; already-existing is success
pub async fn ensure_dir(dir: &Path) -> OpResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ToolError::FilesystemWriteFailed {
            path: dir.display().to_string(),
            source,
        })
}

/// Validates that a user-supplied name is a bare file name
///
/// Rejects empty names, path separators (both kinds, on every platform),
/// `..`/`.` components, and absolute or prefixed paths.
pub fn sanitize_filename(name: &str) -> OpResult<&str> {
    let invalid = |reason| ToolError::InvalidFilename {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("must not contain path separators"));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(invalid("must be a bare file name")),
    }
}
