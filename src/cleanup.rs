//! Scoped cleanup of temporary artifacts
//!
//! Every file or directory the pipeline creates is wrapped in a
//! [`TempArtifact`]. Unless [`TempArtifact::keep`] hands it over to the caller,
//! the artifact is removed when the guard goes away, on every exit path.
//! Removal failures are logged and swallowed so they never mask the error that
//! triggered the cleanup.

use crate::error::CleanupError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Random hex identifier for temp files and extraction directories
pub fn unique_name() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// A not-yet-existing path under `root` with a random name
pub fn unique_path(root: &Path) -> PathBuf {
    root.join(unique_name())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArtifactKind {
    File,
    Dir,
}

/// Guard owning a temp file or directory
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    kind: ArtifactKind,
    armed: bool,
}

impl TempArtifact {
    /// Guard a file path. The file may not exist yet.
    pub fn file(path: PathBuf) -> Self {
        Self {
            path,
            kind: ArtifactKind::File,
            armed: true,
        }
    }

    /// Guard a directory path. The directory may not exist yet.
    pub fn dir(path: PathBuf) -> Self {
        Self {
            path,
            kind: ArtifactKind::Dir,
            armed: true,
        }
    }

    /// Create a fresh directory and guard it
    ///
    /// Fails if `path` already exists, so two jobs can never share one
    /// extraction directory.
    pub async fn create_dir(path: PathBuf) -> io::Result<Self> {
        tokio::fs::create_dir(&path).await?;
        debug!(?path, "created temp directory");
        Ok(Self::dir(path))
    }

    /// Guarded path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand the artifact over to the caller; it will no longer be removed
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }

    /// Remove the artifact now, logging any failure
    pub async fn remove(mut self) {
        self.armed = false;
        let result = match self.kind {
            ArtifactKind::File => tokio::fs::remove_file(&self.path).await,
            ArtifactKind::Dir => tokio::fs::remove_dir_all(&self.path).await,
        };
        report(&self.path, result);
    }

    fn remove_now(&self) {
        let result = match self.kind {
            ArtifactKind::File => std::fs::remove_file(&self.path),
            ArtifactKind::Dir => std::fs::remove_dir_all(&self.path),
        };
        report(&self.path, result);
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if self.armed {
            self.remove_now();
        }
    }
}

fn report(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => debug!(?path, "removed temp artifact"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            let err = CleanupError {
                path: path.to_path_buf(),
                source,
            };
            warn!(error = %err, "cleanup failed, leaving artifact behind");
        }
    }
}
