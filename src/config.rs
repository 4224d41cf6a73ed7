//! Configuration types for bundle-dl

use crate::error::{Error, Result};
use crate::features::{Feature, StaticFeatureFlags};
use crate::report::DEFAULT_ALLOWED_URL_PREFIXES;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External tool paths
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to tar executable (auto-detected if None)
    #[serde(default)]
    pub tar_path: Option<PathBuf>,

    /// Path to zstd executable (auto-detected if None)
    #[serde(default)]
    pub zstd_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Echo tar's stdout/stderr to our stdout while extracting (default: true)
    #[serde(default = "default_true")]
    pub mirror_tool_output: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tar_path: None,
            zstd_path: None,
            search_path: true,
            mirror_tool_output: true,
        }
    }
}

/// Download behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Scratch directory for the default tool cache's gzip extractions
    /// (default: the system temp directory)
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            user_agent: default_user_agent(),
        }
    }
}

/// Telemetry settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// URL prefixes reported verbatim; everything else is sanitized
    #[serde(default = "default_allowed_url_prefixes")]
    pub allowed_url_prefixes: Vec<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            allowed_url_prefixes: default_allowed_url_prefixes(),
        }
    }
}

/// Static feature flag values
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Stream zstd bundles straight into tar (default: false)
    #[serde(default)]
    pub stream_extraction: bool,
}

impl FeatureConfig {
    /// Convert into an injectable flag provider
    pub fn to_flags(&self) -> StaticFeatureFlags {
        let mut enabled = Vec::new();
        if self.stream_extraction {
            enabled.push(Feature::StreamExtraction);
        }
        StaticFeatureFlags::with(enabled)
    }
}

/// Main configuration for BundleDownloader
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// External tool paths
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Telemetry settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Static feature flags
    #[serde(default)]
    pub features: FeatureConfig,
}

impl Config {
    /// Check settings that serde cannot
    pub fn validate(&self) -> Result<()> {
        for prefix in &self.telemetry.allowed_url_prefixes {
            if prefix.is_empty() || !prefix.starts_with("https://") {
                return Err(Error::Config {
                    message: format!("allowed URL prefix must be a non-empty https URL: {prefix:?}"),
                    key: Some("allowed_url_prefixes".to_string()),
                });
            }
        }
        if self.download.user_agent.trim().is_empty() {
            return Err(Error::Config {
                message: "user agent must not be empty".to_string(),
                key: Some("user_agent".to_string()),
            });
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_user_agent() -> String {
    format!("bundle-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_allowed_url_prefixes() -> Vec<String> {
    DEFAULT_ALLOWED_URL_PREFIXES
        .iter()
        .map(|p| p.to_string())
        .collect()
}
