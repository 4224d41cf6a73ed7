//! Bundle acquisition, split into focused submodules.
//!
//! The `BundleDownloader` struct and its methods are organized by phase:
//! - [`strategy`] - Compression method selection and the zstd gate
//! - [`pipeline`] - Streaming and buffered acquisition with phase timing

mod pipeline;
mod strategy;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use strategy::Strategy;

use crate::config::Config;
use crate::error::Result;
use crate::features::FeatureFlags;
use crate::tar::{CliTar, ZstdTarExtractor};
use crate::tool_cache::{HttpToolCache, ToolCache};
use crate::types::{DownloadRequest, DownloadedBundle, Event};
use std::sync::Arc;
use tracing::{error, info};

/// Downloads and extracts bundle archives (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct BundleDownloader {
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Whole-file download and gzip extraction primitives
    pub(crate) tool_cache: Arc<dyn ToolCache>,
    /// Injected feature flag decisions
    pub(crate) features: Arc<dyn FeatureFlags>,
    /// HTTP client for the streaming path
    pub(crate) client: reqwest::Client,
    /// Host tar, resolved once from configuration
    pub(crate) tar: Option<CliTar>,
}

impl BundleDownloader {
    /// Create a downloader with the default HTTP tool cache
    ///
    /// Feature flags come from `config.features`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] if the configuration is invalid, or
    /// [`crate::Error::Network`] if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let features = Arc::new(config.features.to_flags());
        let tool_cache = Arc::new(HttpToolCache::new(&config)?);
        Self::with_collaborators(config, tool_cache, features)
    }

    /// Create a downloader around explicit collaborators
    pub fn with_collaborators(
        config: Config,
        tool_cache: Arc<dyn ToolCache>,
        features: Arc<dyn FeatureFlags>,
    ) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(config.download.user_agent.as_str())
            .build()?;

        let tar = CliTar::resolve(config.tools.tar_path.as_deref(), config.tools.search_path);
        info!(
            tar = ?tar.as_ref().map(CliTar::binary_path),
            mirror_tool_output = config.tools.mirror_tool_output,
            "bundle downloader initialized"
        );

        // Buffer size of 100 events; one acquisition emits at most five
        let (event_tx, _rx) = tokio::sync::broadcast::channel(100);

        Ok(Self {
            event_tx,
            config: Arc::new(config),
            tool_cache,
            features,
            client,
            tar,
        })
    }

    /// Subscribe to acquisition events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bundle_dl::{BundleDownloader, Config, DownloadRequest};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = BundleDownloader::new(Config::default())?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "bundle event");
    ///         }
    ///     });
    ///
    ///     let request = DownloadRequest::new(
    ///         "https://github.com/github/codeql-action/releases/download/codeql-bundle-v2.20.0/codeql-bundle-linux64.tar.zst",
    ///         std::env::temp_dir(),
    ///     );
    ///     let bundle = downloader.download_and_extract(request).await?;
    ///     println!("extracted to {}", bundle.path.display());
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Download the bundle described by `request` and extract it
    ///
    /// Chooses streaming or buffered acquisition once, up front, and never
    /// falls back mid-flight. On success the returned path directly contains
    /// the unpacked bundle; on failure nothing this call created survives.
    ///
    /// # Errors
    ///
    /// Download and tar invocation failures are returned unmodified.
    pub async fn download_and_extract(&self, request: DownloadRequest) -> Result<DownloadedBundle> {
        match self.acquire(&request).await {
            Ok(bundle) => {
                info!(
                    path = ?bundle.path,
                    combined_ms = bundle.report.durations.combined_ms(),
                    stream_extraction = bundle.report.stream_extraction(),
                    "bundle ready"
                );
                self.emit_event(Event::Complete {
                    path: bundle.path.clone(),
                });
                Ok(bundle)
            }
            Err(e) => {
                error!(error = %e, code = e.error_code(), "bundle acquisition failed");
                self.emit_event(Event::Failed {
                    code: e.error_code().to_string(),
                });
                Err(e)
            }
        }
    }

    /// Extractor over the resolved host tar, if there is one
    pub(crate) fn zstd_extractor(&self) -> Option<ZstdTarExtractor> {
        self.tar
            .clone()
            .map(|tar| ZstdTarExtractor::new(tar, self.config.tools.mirror_tool_output))
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
