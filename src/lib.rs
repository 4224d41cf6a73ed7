//! # bundle-dl
//!
//! Acquisition and extraction of large toolchain bundle archives on CI workers.
//!
//! ## Design Philosophy
//!
//! bundle-dl is designed to be:
//! - **Deterministic** - The streaming/buffered choice is made once, up front
//! - **Leak-free** - No partial download or extraction survives a failure
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! Zstd bundles are piped straight from the HTTP response into a spawned
//! `tar -x --zstd` when the host supports it and the `StreamExtraction`
//! feature is enabled; everything else is downloaded in full first.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bundle_dl::{BundleDownloader, Config, DownloadRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.features.stream_extraction = true;
//!
//!     let downloader = BundleDownloader::new(config)?;
//!
//!     let request = DownloadRequest::new(
//!         "https://github.com/github/codeql-action/releases/download/codeql-bundle-v2.20.0/codeql-bundle-linux64.tar.zst",
//!         std::env::temp_dir(),
//!     )
//!     .with_authorization("ghp_example");
//!
//!     let bundle = downloader.download_and_extract(request).await?;
//!     println!("bundle at {}", bundle.path.display());
//!     println!("telemetry: {}", bundle.report.to_json()?);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Zstd availability gate
pub mod availability;
/// Scoped cleanup of temp files and directories
pub mod cleanup;
/// Compression method selection
pub mod compression;
/// Configuration types
pub mod config;
/// Bundle acquisition orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Extraction of downloaded archives
pub mod extraction;
/// Feature flag capability
pub mod features;
/// Archive fetching, buffered and streaming
pub mod fetch;
/// Telemetry report
pub mod report;
/// Host tar probing and invocation
pub mod tar;
/// Phase timing
pub mod timing;
/// Tool cache collaborator
pub mod tool_cache;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use availability::{ZstdAvailability, check_zstd_availability};
pub use compression::{CompressionMethod, infer_compression_method};
pub use config::Config;
pub use downloader::BundleDownloader;
pub use error::{
    CapabilityProbeError, CleanupError, DownloadError, Error, InvocationError, Result,
};
pub use features::{Feature, FeatureFlags, StaticFeatureFlags};
pub use report::ToolsDownloadStatusReport;
pub use timing::DownloadDurations;
pub use tool_cache::{HttpToolCache, ToolCache};
pub use types::{DownloadRequest, DownloadedBundle, Event, TarType, TarVariant};
