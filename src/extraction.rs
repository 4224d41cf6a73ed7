//! Extraction of a fully downloaded bundle archive
//!
//! Gzip tarballs go to the tool cache's own extraction primitive. Zstd
//! tarballs reached through the buffered path are replayed from disk through
//! the same spawned-tar mechanism the streaming path uses.

use crate::cleanup::{TempArtifact, unique_path};
use crate::compression::CompressionMethod;
use crate::error::{Error, Result};
use crate::tar::ZstdTarExtractor;
use crate::tool_cache::ToolCache;
use crate::types::TarVariant;
use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use tracing::info;

/// Extract a downloaded archive, returning the extraction root
///
/// # Arguments
/// * `method` - Compression method inferred from the archive name
/// * `archive_path` - The downloaded archive; left in place for the caller to remove
/// * `dest_root` - Parent of the fresh zstd extraction directory
/// * `tar_variant` - Probed host tar, required for zstd
/// * `tool_cache` - Gzip extraction primitive
/// * `extractor` - Spawned-tar extractor for zstd, `None` when no tar binary exists
///
/// # Errors
///
/// Zstd without a tar variant or without a tar binary is
/// [`Error::NotSupported`]. A failing tar is [`Error::Invocation`] and its
/// half-populated destination is removed first.
pub async fn extract_archive(
    method: CompressionMethod,
    archive_path: &Path,
    dest_root: &Path,
    tar_variant: Option<&TarVariant>,
    tool_cache: &dyn ToolCache,
    extractor: Option<&ZstdTarExtractor>,
) -> Result<PathBuf> {
    match method {
        CompressionMethod::Gzip => {
            info!(archive = ?archive_path, "extracting gzip bundle via tool cache");
            tool_cache.extract_gzip(archive_path).await
        }
        CompressionMethod::Zstd => {
            let (Some(variant), Some(extractor)) = (tar_variant, extractor) else {
                return Err(Error::NotSupported(
                    "zstd extraction requires a tar binary of known version".to_string(),
                ));
            };

            let dest = TempArtifact::create_dir(unique_path(dest_root)).await?;
            info!(archive = ?archive_path, dest = ?dest.path(), %variant, "extracting zstd bundle from disk");

            let file = tokio::fs::File::open(archive_path).await?;
            extractor
                .extract(BufReader::new(file), dest.path(), variant)
                .await?;
            Ok(dest.keep())
        }
    }
}
