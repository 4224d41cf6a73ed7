use crate::cleanup::{TempArtifact, unique_path};
use crate::error::Result;
use crate::tool_cache::ToolCache;
use crate::types::DownloadRequest;
use tracing::debug;

/// Download the whole archive into a uniquely named file under `dest_root`
///
/// The returned guard owns the archive: dropping it deletes the file. A
/// partially written file is removed before a download error is returned.
pub async fn download_buffered(
    tool_cache: &dyn ToolCache,
    request: &DownloadRequest,
) -> Result<TempArtifact> {
    let dest = unique_path(&request.dest_root);
    let guard = TempArtifact::file(dest.clone());
    debug!(?dest, "downloading bundle archive");

    let downloaded = tool_cache
        .download_tool(
            &request.url,
            &dest,
            request.authorization.as_deref(),
            &request.headers,
        )
        .await?;

    if downloaded == dest {
        Ok(guard)
    } else {
        guard.remove().await;
        Ok(TempArtifact::file(downloaded))
    }
}
