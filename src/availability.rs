//! Zstd availability gate
//!
//! Streaming zstd extraction needs a standalone `zstd` binary and a tar new
//! enough to understand `--zstd`. The gate folds both checks into one decision
//! and never fails: probe errors turn into `available: false` plus a reason.

use crate::error::CapabilityProbeError;
use crate::tar::{CliTar, probe_tar, version_at_least};
use crate::types::TarVariant;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of the zstd availability check
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZstdAvailability {
    /// Whether zstd bundles can be extracted on this host
    pub available: bool,
    /// Whether a `zstd` binary was found
    pub found_zstd_binary: bool,
    /// The probed tar, if probing succeeded
    pub tar_variant: Option<TarVariant>,
    /// Why zstd is unavailable, when it is
    pub failure_reason: Option<String>,
}

impl ZstdAvailability {
    fn unavailable(
        found_zstd_binary: bool,
        tar_variant: Option<TarVariant>,
        reason: String,
    ) -> Self {
        Self {
            available: false,
            found_zstd_binary,
            tar_variant,
            failure_reason: Some(reason),
        }
    }
}

/// Decide zstd availability from already gathered facts
///
/// Pure: the same inputs always give the same answer, whatever order the
/// probes ran in.
pub fn evaluate_zstd_availability(
    found_zstd_binary: bool,
    probe: Result<TarVariant, CapabilityProbeError>,
) -> ZstdAvailability {
    let variant = match probe {
        Ok(variant) => variant,
        Err(e) => {
            return ZstdAvailability::unavailable(
                found_zstd_binary,
                None,
                format!("could not determine tar version: {}", e),
            );
        }
    };

    let minimum = variant.tar_type.min_zstd_version();
    let reason = match version_at_least(&variant.version, minimum) {
        None => Some(format!(
            "could not compare {} against minimum {}",
            variant, minimum
        )),
        Some(false) => Some(format!(
            "{} is older than the minimum {} required for zstd",
            variant, minimum
        )),
        Some(true) if !found_zstd_binary => Some("zstd binary not found".to_string()),
        Some(true) => None,
    };

    match reason {
        Some(reason) => ZstdAvailability::unavailable(found_zstd_binary, Some(variant), reason),
        None => ZstdAvailability {
            available: true,
            found_zstd_binary,
            tar_variant: Some(variant),
            failure_reason: None,
        },
    }
}

/// Locate a `zstd` binary, preferring an explicit path
pub fn find_zstd_binary(configured: Option<&Path>, search_path: bool) -> Option<PathBuf> {
    match configured {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        Some(path) => {
            debug!(?path, "configured zstd path does not exist");
            None
        }
        None if search_path => which::which("zstd").ok(),
        None => None,
    }
}

/// Probe the host and decide zstd availability
///
/// A `known_variant` skips the `tar --version` call.
pub async fn check_zstd_availability(
    tar: Option<&CliTar>,
    known_variant: Option<TarVariant>,
    zstd_binary: Option<&Path>,
) -> ZstdAvailability {
    let probe = match known_variant {
        Some(variant) => Ok(variant),
        None => probe_tar(tar).await,
    };
    let availability = evaluate_zstd_availability(zstd_binary.is_some(), probe);

    match &availability.failure_reason {
        Some(reason) => warn!(%reason, "zstd extraction unavailable, falling back to gzip handling"),
        None => debug!(variant = ?availability.tar_variant, "zstd extraction available"),
    }
    availability
}
