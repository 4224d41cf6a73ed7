//! Tool cache collaborator
//!
//! The pipeline only needs two primitives from the tool cache: an
//! authenticated whole-file download and gzip tarball extraction. They sit
//! behind [`ToolCache`] so tests and embedders can substitute their own.

use crate::cleanup::{TempArtifact, unique_path};
use crate::config::Config;
use crate::error::{DownloadError, Error, Result};
use crate::report::sanitize_tools_url;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use futures::StreamExt;
use std::collections::HashMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::task::spawn_blocking;
use tracing::{debug, info};

/// Download and gzip extraction primitives
#[async_trait]
pub trait ToolCache: Send + Sync {
    /// Download `url` to exactly `dest`, following redirects
    ///
    /// # Errors
    ///
    /// HTTP and network failures are returned without retrying. Errors never
    /// carry the raw URL, which may hold a signed query string.
    async fn download_tool(
        &self,
        url: &str,
        dest: &Path,
        authorization: Option<&str>,
        headers: &HashMap<String, String>,
    ) -> Result<PathBuf>;

    /// Extract a `.tar.gz` archive, returning the directory it was unpacked into
    async fn extract_gzip(&self, archive: &Path) -> Result<PathBuf>;
}

/// [`ToolCache`] backed by `reqwest` and the `tar`/`flate2` crates
#[derive(Clone, Debug)]
pub struct HttpToolCache {
    client: reqwest::Client,
    temp_dir: PathBuf,
    allowed_url_prefixes: Vec<String>,
}

impl HttpToolCache {
    /// Build from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.download.user_agent.as_str())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Build around an existing HTTP client
    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            temp_dir: config.download.temp_dir.clone(),
            allowed_url_prefixes: config.telemetry.allowed_url_prefixes.clone(),
        }
    }
}

/// Build a GET request carrying bearer auth and extra headers
pub(crate) fn authorized_get(
    client: &reqwest::Client,
    url: &str,
    authorization: Option<&str>,
    headers: &HashMap<String, String>,
) -> reqwest::RequestBuilder {
    let mut request = client.get(url);
    if let Some(token) = authorization {
        request = request.bearer_auth(token);
    }
    for (name, value) in headers {
        request = request.header(name, value);
    }
    request
}

#[async_trait]
impl ToolCache for HttpToolCache {
    async fn download_tool(
        &self,
        url: &str,
        dest: &Path,
        authorization: Option<&str>,
        headers: &HashMap<String, String>,
    ) -> Result<PathBuf> {
        let response = authorized_get(&self.client, url, authorization, headers)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(DownloadError::HttpStatus {
                url: sanitize_tools_url(url, &self.allowed_url_prefixes),
                status: response.status().as_u16(),
            }
            .into());
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut body = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| DownloadError::Transfer {
                url: sanitize_tools_url(url, &self.allowed_url_prefixes),
                reason: e.without_url().to_string(),
            })?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(?dest, bytes = written, "download complete");
        Ok(dest.to_path_buf())
    }

    async fn extract_gzip(&self, archive: &Path) -> Result<PathBuf> {
        let dest = TempArtifact::create_dir(unique_path(&self.temp_dir)).await?;
        info!(?archive, dest = ?dest.path(), "extracting gzip tarball");

        let archive_owned = archive.to_path_buf();
        let dest_owned = dest.path().to_path_buf();
        spawn_blocking(move || -> std::io::Result<()> {
            let file = std::fs::File::open(&archive_owned)?;
            let mut tarball = ::tar::Archive::new(GzDecoder::new(BufReader::new(file)));
            tarball.set_preserve_permissions(true);
            tarball.unpack(&dest_owned)
        })
        .await
        .map_err(|e| Error::ExternalTool(format!("gzip extraction task panicked: {}", e)))??;

        Ok(dest.keep())
    }
}
