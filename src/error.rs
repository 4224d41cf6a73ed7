//! Error types for bundle-dl
//!
//! Fatal failures (download, tar invocation) bubble up unmodified through
//! [`Error`]. Capability probe failures are demoted by the zstd gate and cleanup
//! failures are only ever logged, so neither escapes the pipeline on its own.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bundle-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bundle-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "allowed_url_prefixes")
        key: Option<String>,
    },

    /// Host `tar` could not be classified
    #[error("tar capability probe failed: {0}")]
    CapabilityProbe(#[from] CapabilityProbeError),

    /// Archive download failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Spawned tar exited unsuccessfully
    #[error("{0}")]
    Invocation(#[from] InvocationError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// External tool could not be started
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported on this host or with this input
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl Error {
    /// Machine-readable error code, stable across releases
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::CapabilityProbe(_) => "capability_probe_failed",
            Error::Download(e) => match e {
                DownloadError::HttpStatus { .. } => "download_http_status",
                DownloadError::Transfer { .. } => "download_failed",
            },
            Error::Invocation(_) => "invocation_failed",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
        }
    }

    /// Exit code of the spawned tar process, if this is an invocation failure
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Invocation(e) => e.exit_code,
            _ => None,
        }
    }
}

/// Failures classifying the host `tar` binary
#[derive(Debug, Error)]
pub enum CapabilityProbeError {
    /// No tar binary configured or found on PATH
    #[error("tar binary not found")]
    TarNotFound,

    /// `tar --version` could not be executed
    #[error("failed to run tar --version: {0}")]
    Spawn(String),

    /// Output matched neither GNU tar nor bsdtar
    #[error("unrecognized tar --version output: {output}")]
    UnrecognizedOutput {
        /// The raw version output
        output: String,
    },
}

/// Download-related errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Server answered with something other than 200 OK
    #[error("unexpected HTTP status {status} downloading {url}")]
    HttpStatus {
        /// Sanitized download URL
        url: String,
        /// Status code returned by the server
        status: u16,
    },

    /// Body transfer failed part way
    #[error("transfer of {url} failed: {reason}")]
    Transfer {
        /// Sanitized download URL
        url: String,
        /// Underlying failure
        reason: String,
    },
}

/// A spawned tar process exited unsuccessfully
#[derive(Debug, Error)]
#[error("`{command}` failed with exit code {exit_code:?}: {stderr}")]
pub struct InvocationError {
    /// Command line that was run
    pub command: String,
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Everything the process wrote to stdout
    pub stdout: String,
    /// Everything the process wrote to stderr
    pub stderr: String,
}

/// A temp artifact could not be removed. Logged, never returned.
#[derive(Debug, Error)]
#[error("failed to remove {path}: {source}")]
pub struct CleanupError {
    /// The file or directory that survived
    pub path: PathBuf,
    /// Underlying failure
    #[source]
    pub source: std::io::Error,
}
