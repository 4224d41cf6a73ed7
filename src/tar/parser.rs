//! Parser for `tar --version` output and tar version ordering

use crate::error::CapabilityProbeError;
use crate::types::{TarType, TarVariant};
use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static GNU_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tar \(GNU tar\) ([0-9]+(?:\.[0-9]+)*)").expect("valid regex"));

#[allow(clippy::expect_used)]
static BSD_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bsdtar ([0-9]+(?:\.[0-9]+)*)").expect("valid regex"));

/// Classify `tar --version` output
///
/// GNU tar prints `tar (GNU tar) 1.34`, bsdtar prints `bsdtar 3.6.2 - libarchive 3.6.2 ...`.
/// Anything else is a [`CapabilityProbeError::UnrecognizedOutput`].
pub fn parse_tar_version(output: &str) -> Result<TarVariant, CapabilityProbeError> {
    let (tar_type, pattern) = if output.contains("GNU tar") {
        (TarType::Gnu, &*GNU_VERSION)
    } else if output.contains("bsdtar") {
        (TarType::Bsd, &*BSD_VERSION)
    } else {
        return Err(unrecognized(output));
    };

    pattern
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| TarVariant::new(tar_type, m.as_str()))
        .ok_or_else(|| unrecognized(output))
}

fn unrecognized(output: &str) -> CapabilityProbeError {
    CapabilityProbeError::UnrecognizedOutput {
        output: output.lines().next().unwrap_or_default().trim().to_string(),
    }
}

/// Coerce a dotted numeric tar version into a semver [`Version`]
///
/// Missing components are zero ("1.31" is 1.31.0), components past the patch
/// level are ignored, and trailing non-numeric text ("1.34-rc1") is dropped.
/// Returns `None` when no leading number is present.
pub fn coerce_version(version: &str) -> Option<Version> {
    let mut parts = version
        .trim()
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u64>().ok()
        })
        .map_while(|part| part);

    let major = parts.next()?;
    let minor = parts.next().unwrap_or(0);
    let patch = parts.next().unwrap_or(0);
    Some(Version::new(major, minor, patch))
}

/// Whether `version` is at least `minimum`, using numeric ordering
///
/// "1.10" is newer than "1.9" here, unlike a string comparison. `None` when
/// either side cannot be parsed.
pub fn version_at_least(version: &str, minimum: &str) -> Option<bool> {
    Some(coerce_version(version)? >= coerce_version(minimum)?)
}
