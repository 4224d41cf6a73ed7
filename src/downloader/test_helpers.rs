//! Shared test helpers for creating BundleDownloader instances in tests.

use crate::cleanup::unique_path;
use crate::config::Config;
use crate::downloader::BundleDownloader;
use crate::error::{DownloadError, Error, Result};
use crate::features::StaticFeatureFlags;
use crate::report::SANITIZED_URL;
use crate::tool_cache::ToolCache;
use crate::types::Event;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-process tool cache double
///
/// Downloads write a small placeholder archive; gzip extraction creates a
/// fresh directory under `extract_root` holding a `VERSION` marker.
pub(crate) struct FakeToolCache {
    pub(crate) extract_root: PathBuf,
    pub(crate) fail_download_status: Option<u16>,
    pub(crate) fail_extract: bool,
    downloads: AtomicUsize,
    extractions: AtomicUsize,
}

impl FakeToolCache {
    pub(crate) fn new(extract_root: &Path) -> Self {
        Self {
            extract_root: extract_root.to_path_buf(),
            fail_download_status: None,
            fail_extract: false,
            downloads: AtomicUsize::new(0),
            extractions: AtomicUsize::new(0),
        }
    }

    pub(crate) fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub(crate) fn extractions(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolCache for FakeToolCache {
    async fn download_tool(
        &self,
        _url: &str,
        dest: &Path,
        _authorization: Option<&str>,
        _headers: &HashMap<String, String>,
    ) -> Result<PathBuf> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_download_status {
            return Err(DownloadError::HttpStatus {
                url: SANITIZED_URL.to_string(),
                status,
            }
            .into());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        tokio::fs::write(dest, b"placeholder archive").await?;
        Ok(dest.to_path_buf())
    }

    async fn extract_gzip(&self, archive: &Path) -> Result<PathBuf> {
        self.extractions.fetch_add(1, Ordering::SeqCst);
        assert!(archive.exists(), "archive must exist while extracting");
        if self.fail_extract {
            return Err(Error::ExternalTool("corrupt gzip stream".to_string()));
        }
        tokio::time::sleep(Duration::from_millis(3)).await;
        let dest = unique_path(&self.extract_root);
        tokio::fs::create_dir(&dest).await?;
        tokio::fs::write(dest.join("VERSION"), b"2.20.0").await?;
        Ok(dest)
    }
}

/// Config that never touches the host's tar or zstd
pub(crate) fn isolated_config() -> Config {
    let mut config = Config::default();
    config.tools.tar_path = None;
    config.tools.zstd_path = None;
    config.tools.search_path = false;
    config.tools.mirror_tool_output = false;
    config
}

/// Build a downloader around a fake tool cache and fixed flags
pub(crate) fn create_test_downloader(
    config: Config,
    tool_cache: Arc<FakeToolCache>,
    flags: StaticFeatureFlags,
) -> BundleDownloader {
    BundleDownloader::with_collaborators(config, tool_cache, Arc::new(flags)).unwrap()
}

/// Drain every event already sent to `rx`
pub(crate) fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
