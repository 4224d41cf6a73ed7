//! Core types for bundle-dl

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::compression::CompressionMethod;
use crate::report::ToolsDownloadStatusReport;

/// Flavour of the host `tar` binary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TarType {
    /// GNU tar
    Gnu,
    /// libarchive's bsdtar
    Bsd,
}

impl TarType {
    /// Oldest version of this tar flavour that understands `--zstd`
    pub fn min_zstd_version(self) -> &'static str {
        match self {
            TarType::Gnu => "1.31",
            TarType::Bsd => "3.4.3",
        }
    }
}

impl fmt::Display for TarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TarType::Gnu => write!(f, "gnu"),
            TarType::Bsd => write!(f, "bsd"),
        }
    }
}

/// Probed capability of the host `tar`
///
/// Probed once per run and never cached across runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarVariant {
    /// GNU or BSD
    #[serde(rename = "type")]
    pub tar_type: TarType,
    /// Dotted numeric version, e.g. "1.34" or "3.6.2"
    pub version: String,
}

impl TarVariant {
    /// Create a new variant
    pub fn new(tar_type: TarType, version: impl Into<String>) -> Self {
        Self {
            tar_type,
            version: version.into(),
        }
    }

    /// Shorthand for a GNU tar variant
    pub fn gnu(version: impl Into<String>) -> Self {
        Self::new(TarType::Gnu, version)
    }

    /// Shorthand for a bsdtar variant
    pub fn bsd(version: impl Into<String>) -> Self {
        Self::new(TarType::Bsd, version)
    }
}

impl fmt::Display for TarVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tar {}", self.tar_type, self.version)
    }
}

/// Everything needed to fetch one bundle
#[derive(Clone, Debug)]
pub struct DownloadRequest {
    /// Fully resolved download URL
    pub url: String,
    /// Bearer token, sent as `Authorization: Bearer <token>`
    pub authorization: Option<String>,
    /// Extra request headers
    pub headers: HashMap<String, String>,
    /// Pre-probed tar capability; probed on demand when `None`
    pub tar_variant: Option<TarVariant>,
    /// Existing, writable directory that receives the archive and extraction root
    pub dest_root: PathBuf,
}

impl DownloadRequest {
    /// Request with no auth, no extra headers and no pre-probed tar
    pub fn new(url: impl Into<String>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            authorization: None,
            headers: HashMap::new(),
            tar_variant: None,
            dest_root: dest_root.into(),
        }
    }

    /// Attach a bearer token
    pub fn with_authorization(mut self, token: impl Into<String>) -> Self {
        self.authorization = Some(token.into());
        self
    }

    /// Add a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Supply an already probed tar variant
    pub fn with_tar_variant(mut self, variant: TarVariant) -> Self {
        self.tar_variant = Some(variant);
        self
    }
}

/// A successfully installed bundle
#[must_use]
#[derive(Clone, Debug)]
pub struct DownloadedBundle {
    /// Extraction root, directly containing the unpacked bundle layout
    pub path: PathBuf,
    /// Telemetry for the run
    pub report: ToolsDownloadStatusReport,
}

/// Progress events emitted by [`crate::BundleDownloader`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Compression method inferred from the archive name
    MethodSelected {
        /// The chosen method
        method: CompressionMethod,
    },
    /// Download started
    Downloading {
        /// Whether extraction overlaps the download
        streaming: bool,
    },
    /// Buffered download finished, extraction started
    Extracting,
    /// Bundle extracted
    Complete {
        /// Extraction root
        path: PathBuf,
    },
    /// Acquisition failed
    Failed {
        /// Machine-readable error code
        code: String,
    },
}
