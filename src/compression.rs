//! Compression method inference from archive names

use serde::{Deserialize, Serialize};
use std::fmt;

const GZIP_SUFFIX: &str = ".tar.gz";

/// How a bundle archive is compressed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMethod {
    /// `.tar.gz`
    Gzip,
    /// `.tar.zst`
    Zstd,
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Gzip => write!(f, "gzip"),
            CompressionMethod::Zstd => write!(f, "zstd"),
        }
    }
}

/// Infer the compression method from an archive name or URL
///
/// Names ending in `.tar.gz` are gzip; everything else is zstd, since bundles
/// are only ever published in those two formats. No content sniffing happens.
///
/// # Examples
///
/// ```
/// use bundle_dl::compression::{CompressionMethod, infer_compression_method};
///
/// assert_eq!(infer_compression_method("codeql-bundle-linux64.tar.gz"), CompressionMethod::Gzip);
/// assert_eq!(infer_compression_method("codeql-bundle-linux64.tar.zst"), CompressionMethod::Zstd);
/// ```
#[must_use]
pub fn infer_compression_method(name: &str) -> CompressionMethod {
    // Query strings on pre-signed URLs would otherwise hide the suffix
    let name = name.split(['?', '#']).next().unwrap_or(name);
    if name.ends_with(GZIP_SUFFIX) {
        CompressionMethod::Gzip
    } else {
        CompressionMethod::Zstd
    }
}
