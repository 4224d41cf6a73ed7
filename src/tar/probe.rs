//! Host `tar` discovery and capability probing

use super::parser::parse_tar_version;
use crate::error::CapabilityProbeError;
use crate::types::TarVariant;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Handle to a host `tar` binary
///
/// # Examples
///
/// ```no_run
/// use bundle_dl::tar::CliTar;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tar = CliTar::from_path().expect("tar not found in PATH");
/// let variant = tar.probe().await?;
/// println!("host tar: {variant}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct CliTar {
    binary_path: PathBuf,
}

impl CliTar {
    /// Create a handle for an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find `tar` in PATH
    pub fn from_path() -> Option<Self> {
        which::which("tar").ok().map(Self::new)
    }

    /// Resolve from an optional configured path, falling back to PATH when allowed
    pub fn resolve(configured: Option<&Path>, search_path: bool) -> Option<Self> {
        match configured {
            Some(path) => Some(Self::new(path.to_path_buf())),
            None if search_path => Self::from_path(),
            None => None,
        }
    }

    /// Path of the binary this handle runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Run `tar --version` and classify the result
    pub async fn probe(&self) -> Result<TarVariant, CapabilityProbeError> {
        let output = Command::new(&self.binary_path)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                CapabilityProbeError::Spawn(format!("{}: {}", self.binary_path.display(), e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(
            binary = %self.binary_path.display(),
            status = ?output.status.code(),
            first_line = stdout.lines().next().unwrap_or_default(),
            "probed tar version"
        );

        parse_tar_version(&stdout)
    }
}

/// Probe an optional tar handle; a missing handle is a probe failure
pub async fn probe_tar(tar: Option<&CliTar>) -> Result<TarVariant, CapabilityProbeError> {
    match tar {
        Some(tar) => tar.probe().await,
        None => Err(CapabilityProbeError::TarNotFound),
    }
}
