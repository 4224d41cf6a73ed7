use crate::cleanup::{TempArtifact, unique_path};
use crate::error::{DownloadError, Error, Result};
use crate::report::sanitize_tools_url;
use crate::tar::ZstdTarExtractor;
use crate::tool_cache::authorized_get;
use crate::types::{DownloadRequest, TarVariant};
use futures::TryStreamExt;
use std::io;
use std::path::PathBuf;
use tokio_util::io::StreamReader;
use tracing::info;

/// Download a zstd bundle and extract it while it arrives
///
/// Opens a GET for `request.url` and pipes the response body into
/// `tar -x --zstd` targeting a fresh directory under `request.dest_root`.
/// The transport only reads more of the body once tar has accepted the
/// previous chunk, so memory stays bounded regardless of archive size.
///
/// # Errors
///
/// - [`Error::NotSupported`] without a tar variant, before any request is made
/// - [`DownloadError::HttpStatus`] for anything but 200 OK
/// - [`Error::Invocation`] if tar exits non-zero
/// - [`Error::Network`] if the connection fails; the error carries no URL
///
/// On any error the extraction directory is removed before returning.
pub async fn stream_and_extract(
    client: &reqwest::Client,
    extractor: &ZstdTarExtractor,
    request: &DownloadRequest,
    tar_variant: Option<&TarVariant>,
    allowed_url_prefixes: &[String],
) -> Result<PathBuf> {
    let Some(variant) = tar_variant else {
        return Err(Error::NotSupported(
            "streaming zstd extraction requires a known tar version".to_string(),
        ));
    };

    let dest = TempArtifact::create_dir(unique_path(&request.dest_root)).await?;

    let response = authorized_get(
        client,
        &request.url,
        request.authorization.as_deref(),
        &request.headers,
    )
    .send()
    .await
    .map_err(reqwest::Error::without_url)?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(DownloadError::HttpStatus {
            url: sanitize_tools_url(&request.url, allowed_url_prefixes),
            status: response.status().as_u16(),
        }
        .into());
    }

    info!(
        dest = ?dest.path(),
        content_length = ?response.content_length(),
        %variant,
        "streaming bundle into tar"
    );

    let body = Box::pin(
        response
            .bytes_stream()
            .map_err(|e| io::Error::other(e.without_url())),
    );
    extractor
        .extract(StreamReader::new(body), dest.path(), variant)
        .await?;

    Ok(dest.keep())
}
