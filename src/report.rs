//! Telemetry report for a bundle download
//!
//! The report is the only thing handed to the telemetry sender, so the tools
//! URL is scrubbed: anything outside the trusted release locations may carry
//! pre-signed tokens and is replaced by [`SANITIZED_URL`].

use crate::compression::CompressionMethod;
use crate::timing::DownloadDurations;
use serde::{Serialize, Serializer};
use url::Url;

/// Placeholder reported instead of an untrusted URL
pub const SANITIZED_URL: &str = "sanitized-value";

/// Release locations whose URLs are safe to report verbatim
pub const DEFAULT_ALLOWED_URL_PREFIXES: &[&str] = &[
    "https://github.com/github/codeql-action/releases/",
    "https://github.com/dsp-testing/codeql-cli-nightlies/releases/",
];

/// Return `url` unchanged if it points into an allowed release location,
/// otherwise [`SANITIZED_URL`]
///
/// URLs with credentials or a query string are always sanitized.
///
/// # Examples
///
/// ```
/// use bundle_dl::report::{sanitize_tools_url, SANITIZED_URL};
///
/// let allowed = ["https://github.com/github/codeql-action/releases/".to_string()];
/// let trusted = "https://github.com/github/codeql-action/releases/download/codeql-bundle-v2.20.0/codeql-bundle-linux64.tar.zst";
/// assert_eq!(sanitize_tools_url(trusted, &allowed), trusted);
/// assert_eq!(sanitize_tools_url("https://storage.example.com/b.tar.zst?sig=x", &allowed), SANITIZED_URL);
/// ```
pub fn sanitize_tools_url(url: &str, allowed_prefixes: &[String]) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return SANITIZED_URL.to_string();
    };

    if !parsed.username().is_empty() || parsed.password().is_some() || parsed.query().is_some()
    {
        return SANITIZED_URL.to_string();
    }

    let normalized = parsed.as_str();
    if allowed_prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && normalized.starts_with(prefix.as_str()))
    {
        url.to_string()
    } else {
        SANITIZED_URL.to_string()
    }
}

/// Outcome of one bundle download, as sent to telemetry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolsDownloadStatusReport {
    /// How the archive was compressed
    pub compression_method: CompressionMethod,
    /// Sanitized download URL
    pub tools_url: String,
    /// Why zstd streaming was not used, if the gate refused it
    pub zstd_failure_reason: Option<String>,
    /// Measured durations for the path that ran
    pub durations: DownloadDurations,
}

impl ToolsDownloadStatusReport {
    /// Build a report, sanitizing `raw_url` against `allowed_prefixes`
    pub fn new(
        compression_method: CompressionMethod,
        raw_url: &str,
        allowed_prefixes: &[String],
        zstd_failure_reason: Option<String>,
        durations: DownloadDurations,
    ) -> Self {
        Self {
            compression_method,
            tools_url: sanitize_tools_url(raw_url, allowed_prefixes),
            zstd_failure_reason,
            durations,
        }
    }

    /// Whether download and extraction overlapped
    pub fn stream_extraction(&self) -> bool {
        self.durations.is_streamed()
    }

    /// Render as a JSON value
    pub fn to_json(&self) -> crate::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireReport<'a> {
    compression_method: CompressionMethod,
    tools_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    zstd_failure_reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extraction_duration_ms: Option<u64>,
    combined_duration_ms: u64,
    stream_extraction: bool,
}

impl Serialize for ToolsDownloadStatusReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (download, extraction) = match self.durations {
            DownloadDurations::DownloadFirst {
                download_ms,
                extraction_ms,
                ..
            } => (Some(download_ms), Some(extraction_ms)),
            DownloadDurations::Streamed { .. } => (None, None),
        };

        WireReport {
            compression_method: self.compression_method,
            tools_url: &self.tools_url,
            zstd_failure_reason: self.zstd_failure_reason.as_deref(),
            download_duration_ms: download,
            extraction_duration_ms: extraction,
            combined_duration_ms: self.durations.combined_ms(),
            stream_extraction: self.durations.is_streamed(),
        }
        .serialize(serializer)
    }
}
