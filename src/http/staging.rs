//! Staging of in-memory uploads.
//!
//! Multipart transports read parts from disk, so each [`Upload`] is written to
//! `<dir>/<uuid><filename>` before sending. The files belong to one call and
//! are removed when its [`StagedFiles`] guard drops, on success and failure
//! alike.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::http::args::Upload;

/// Files staged for a single call.
#[derive(Debug, Default)]
pub struct StagedFiles {
    paths: Vec<PathBuf>,
}

impl StagedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for StagedFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => tracing::trace!(path = %path.display(), "Removed staged upload"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove staged upload"
                ),
            }
        }
    }
}

/// Writes uploads into a staging directory.
#[derive(Debug, Clone)]
pub struct Stager {
    dir: PathBuf,
}

impl Default for Stager {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl Stager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join("easyhttp")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `upload` to a fresh file and registers it with `staged`.
    pub fn stage(&self, upload: &Upload, staged: &mut StagedFiles) -> Result<PathBuf> {
        let staging_error = |source| Error::Staging {
            filename: upload.filename.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(staging_error)?;

        let basename = Path::new(&upload.filename)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = self
            .dir
            .join(format!("{}{}", Uuid::new_v4().simple(), basename));

        // Tracked before writing so a partial file is still cleaned up.
        staged.track(path.clone());
        fs::write(&path, &upload.bytes).map_err(staging_error)?;

        tracing::debug!(
            filename = %upload.filename,
            path = %path.display(),
            bytes = upload.bytes.len(),
            "Staged upload"
        );
        Ok(path)
    }
}
