//! Test configuration helpers and host capability detection

use bundle_dl::availability::find_zstd_binary;
use bundle_dl::tar::CliTar;
use bundle_dl::{Config, TarVariant, check_zstd_availability};
use std::path::{Path, PathBuf};

/// Config using the host's tools, with gzip scratch space under `temp_dir`
pub fn host_config(temp_dir: &Path) -> Config {
    let mut config = Config::default();
    config.download.temp_dir = temp_dir.to_path_buf();
    config.tools.mirror_tool_output = false;
    config
}

/// The host tar, if it can extract zstd bundles here
///
/// Prints why not, so skipped tests are visible with `--nocapture`.
pub async fn zstd_capable_host() -> Option<TarVariant> {
    let tar = CliTar::from_path();
    let zstd = find_zstd_binary(None, true);
    let availability = check_zstd_availability(tar.as_ref(), None, zstd.as_deref()).await;
    if !availability.available {
        eprintln!(
            "skipping: zstd unavailable on this host ({})",
            availability.failure_reason.unwrap_or_default()
        );
        return None;
    }
    availability.tar_variant
}

/// Write a stand-in `tar` that claims to be GNU tar 1.32 and exits with
/// `exit_code` when asked to extract
///
/// With `drain_stdin` it reads the whole archive first; otherwise it exits
/// immediately and the writer sees a broken pipe.
#[cfg(unix)]
pub fn fake_tar(dir: &Path, exit_code: i32, drain_stdin: bool) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-tar");
    let drain = if drain_stdin { "cat > /dev/null" } else { ":" };
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"--version\" ]; then\n\
         \x20 echo 'tar (GNU tar) 1.32'\n\
         \x20 exit 0\n\
         fi\n\
         {drain}\n\
         echo 'fake-tar: refusing to extract' >&2\n\
         exit {exit_code}\n"
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// An existing file standing in for the `zstd` binary; only its presence is checked
pub fn fake_zstd(dir: &Path) -> PathBuf {
    let path = dir.join("fake-zstd");
    std::fs::write(&path, b"").unwrap();
    path
}
