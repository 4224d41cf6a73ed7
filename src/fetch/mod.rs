//! Bundle archive fetching
//!
//! Two strategies, chosen once per acquisition:
//! - [`download_buffered`] stages the whole archive on disk first
//! - [`stream_and_extract`] pipes the HTTP body straight into tar

mod buffered;
mod streaming;

pub use buffered::download_buffered;
pub use streaming::stream_and_extract;
