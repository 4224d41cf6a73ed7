//! Host `tar` integration
//!
//! - [`CliTar`] locates the binary and probes its flavour and version
//! - [`ZstdTarExtractor`] drives `tar -x --zstd` from any byte source
//! - [`TeeWriter`] captures child output while mirroring it live

mod extract;
mod parser;
mod probe;
mod tee;

pub use extract::{ZstdTarExtractor, zstd_extract_args};
pub use parser::{coerce_version, parse_tar_version, version_at_least};
pub use probe::{CliTar, probe_tar};
pub use tee::{TeeWriter, drain_into};
