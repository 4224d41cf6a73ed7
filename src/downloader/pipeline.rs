//! Acquisition paths: streamed, or download-then-extract

use super::BundleDownloader;
use super::strategy::Strategy;
use crate::cleanup::TempArtifact;
use crate::compression::{CompressionMethod, infer_compression_method};
use crate::error::{Error, Result};
use crate::extraction::extract_archive;
use crate::fetch::{download_buffered, stream_and_extract};
use crate::report::ToolsDownloadStatusReport;
use crate::timing::TimingRecorder;
use crate::types::{DownloadRequest, DownloadedBundle, Event};
use std::io;
use std::path::PathBuf;
use tracing::info;

impl BundleDownloader {
    /// Run one acquisition: select method, gate, then exactly one path
    pub(crate) async fn acquire(&self, request: &DownloadRequest) -> Result<DownloadedBundle> {
        let method = infer_compression_method(&request.url);
        info!(%method, dest_root = ?request.dest_root, "compression method selected");
        self.emit_event(Event::MethodSelected { method });

        let strategy = self.select_strategy(method, request).await;
        let mut timing = TimingRecorder::new();

        let path = if strategy.streaming {
            self.run_streaming(&strategy, request, &mut timing).await?
        } else {
            self.run_buffered(&strategy, request, &mut timing).await?
        };

        let Some(durations) = timing.finish() else {
            TempArtifact::dir(path).remove().await;
            return Err(Error::Io(io::Error::other(
                "acquisition finished without measured phases",
            )));
        };

        let report = ToolsDownloadStatusReport::new(
            method,
            &request.url,
            &self.config.telemetry.allowed_url_prefixes,
            strategy.zstd_failure_reason,
            durations,
        );
        Ok(DownloadedBundle { path, report })
    }

    async fn run_streaming(
        &self,
        strategy: &Strategy,
        request: &DownloadRequest,
        timing: &mut TimingRecorder,
    ) -> Result<PathBuf> {
        let extractor = self.zstd_extractor().ok_or_else(|| {
            Error::NotSupported("streaming extraction requires a tar binary".to_string())
        })?;

        self.emit_event(Event::Downloading { streaming: true });
        timing
            .streamed(stream_and_extract(
                &self.client,
                &extractor,
                request,
                strategy.tar_variant.as_ref(),
                &self.config.telemetry.allowed_url_prefixes,
            ))
            .await
    }

    async fn run_buffered(
        &self,
        strategy: &Strategy,
        request: &DownloadRequest,
        timing: &mut TimingRecorder,
    ) -> Result<PathBuf> {
        let extractor = self.zstd_extractor();
        if strategy.method == CompressionMethod::Zstd
            && (strategy.tar_variant.is_none() || extractor.is_none())
        {
            let reason = strategy
                .zstd_failure_reason
                .as_deref()
                .unwrap_or("tar binary not found");
            return Err(Error::NotSupported(format!(
                "cannot extract zstd bundle on this host: {}",
                reason
            )));
        }

        self.emit_event(Event::Downloading { streaming: false });
        let archive = timing
            .download(download_buffered(self.tool_cache.as_ref(), request))
            .await?;

        self.emit_event(Event::Extracting);
        let extracted = timing
            .extraction(extract_archive(
                strategy.method,
                archive.path(),
                &request.dest_root,
                strategy.tar_variant.as_ref(),
                self.tool_cache.as_ref(),
                extractor.as_ref(),
            ))
            .await;

        archive.remove().await;
        extracted
    }
}
