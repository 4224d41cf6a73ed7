//! Up-front choice between streaming and buffered acquisition

use super::BundleDownloader;
use crate::availability::{check_zstd_availability, find_zstd_binary};
use crate::compression::CompressionMethod;
use crate::features::Feature;
use crate::types::{DownloadRequest, TarVariant};
use tracing::{debug, info};

/// How one acquisition will run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Strategy {
    /// Compression method inferred from the URL
    pub method: CompressionMethod,
    /// Whether download and extraction overlap
    pub streaming: bool,
    /// Host tar, from the request or probed
    pub tar_variant: Option<TarVariant>,
    /// Why a zstd archive is not being streamed because of the gate
    pub zstd_failure_reason: Option<String>,
}

impl BundleDownloader {
    /// Decide the acquisition strategy for `request`
    ///
    /// Gzip never probes the host. Zstd runs the availability gate, which
    /// never fails; streaming additionally needs the feature flag and a Unix
    /// host.
    pub(crate) async fn select_strategy(
        &self,
        method: CompressionMethod,
        request: &DownloadRequest,
    ) -> Strategy {
        if method == CompressionMethod::Gzip {
            return Strategy {
                method,
                streaming: false,
                tar_variant: request.tar_variant.clone(),
                zstd_failure_reason: None,
            };
        }

        let tools = &self.config.tools;
        let zstd_binary = find_zstd_binary(tools.zstd_path.as_deref(), tools.search_path);
        let availability = check_zstd_availability(
            self.tar.as_ref(),
            request.tar_variant.clone(),
            zstd_binary.as_deref(),
        )
        .await;

        let flag_enabled = self.features.is_enabled(Feature::StreamExtraction).await;
        let streaming =
            cfg!(unix) && flag_enabled && availability.available && self.tar.is_some();
        debug!(
            flag_enabled,
            available = availability.available,
            unix = cfg!(unix),
            streaming,
            "zstd strategy decided"
        );

        let zstd_failure_reason = if streaming {
            None
        } else {
            availability.failure_reason
        };
        if let Some(reason) = &zstd_failure_reason {
            info!(%reason, "using buffered zstd download");
        }

        Strategy {
            method,
            streaming,
            tar_variant: availability.tar_variant,
            zstd_failure_reason,
        }
    }
}
