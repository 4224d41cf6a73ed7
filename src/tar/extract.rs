//! `tar -x --zstd` driven from an arbitrary byte source
//!
//! The same mechanism serves both the streaming path (HTTP body as source) and
//! the buffered zstd path (archive file as source). Bytes are pumped into the
//! child's stdin one chunk at a time, so a slow tar throttles the source and
//! nothing beyond one chunk is buffered in memory.

use super::probe::CliTar;
use super::tee::{TeeWriter, drain_into};
use crate::error::{Error, InvocationError, Result};
use crate::types::{TarType, TarVariant};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const PUMP_CHUNK: usize = 64 * 1024;

/// Arguments for extracting a zstd tarball from stdin into `dest`
///
/// GNU tar additionally gets `--warning=no-unknown-keyword --overwrite` so that
/// archives produced by bsdtar extract cleanly.
pub fn zstd_extract_args(variant: &TarVariant, dest: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-x".into(), "--zstd".into()];
    if variant.tar_type == TarType::Gnu {
        args.push("--warning=no-unknown-keyword".into());
        args.push("--overwrite".into());
    }
    args.push("-f".into());
    args.push("-".into());
    args.push("-C".into());
    args.push(dest.as_os_str().to_os_string());
    args
}

/// Extracts zstd tarballs by piping bytes into a spawned `tar`
#[derive(Clone, Debug)]
pub struct ZstdTarExtractor {
    tar: CliTar,
    mirror_output: bool,
}

impl ZstdTarExtractor {
    /// Create an extractor around a tar handle
    ///
    /// With `mirror_output` the child's stdout and stderr are echoed to our
    /// stdout as they arrive, in addition to being captured.
    pub fn new(tar: CliTar, mirror_output: bool) -> Self {
        Self { tar, mirror_output }
    }

    /// Pipe `source` through `tar -x --zstd` into the existing directory `dest`
    ///
    /// # Errors
    ///
    /// - [`Error::Invocation`] if tar exits non-zero, carrying the exit code and
    ///   everything tar printed
    /// - [`Error::Network`] / [`Error::Io`] if `source` fails mid-stream; this
    ///   takes precedence over tar's complaint about the truncated input
    /// - [`Error::ExternalTool`] if tar cannot be spawned
    ///
    /// `dest` is left as-is on failure; removing it is the caller's job.
    pub async fn extract<R>(&self, source: R, dest: &Path, variant: &TarVariant) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let args = zstd_extract_args(variant, dest);
        let command = render_command(self.tar.binary_path(), &args);
        debug!(%command, %variant, "spawning tar");

        let mut child = Command::new(self.tar.binary_path())
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::ExternalTool(format!("failed to execute tar: {}", e)))?;

        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(Error::ExternalTool(
                "tar was spawned without piped stdio".to_string(),
            ));
        };

        let stdout_task = tokio::spawn(drain_into(stdout, TeeWriter::new(self.mirror())));
        let stderr_task = tokio::spawn(drain_into(stderr, TeeWriter::new(self.mirror())));

        let pumped = pump(source, stdin).await;
        let status = child.wait().await?;
        let stdout = collect_output(stdout_task, "stdout").await;
        let stderr = collect_output(stderr_task, "stderr").await;

        let bytes = match pumped {
            Err(PumpError::Source(e)) => {
                warn!(%command, error = %e, "archive source failed while piping into tar");
                return Err(source_error(e));
            }
            Err(PumpError::Sink(e)) if status.success() => {
                return Err(Error::Io(e));
            }
            Err(PumpError::Sink(e)) => {
                debug!(error = %e, "tar closed stdin early");
                None
            }
            Ok(bytes) => Some(bytes),
        };

        if !status.success() {
            warn!(%command, exit_code = ?status.code(), %stderr, "tar failed");
            return Err(Error::Invocation(InvocationError {
                command,
                exit_code: status.code(),
                stdout,
                stderr,
            }));
        }

        info!(?dest, bytes, "tar extraction complete");
        Ok(())
    }

    fn mirror(&self) -> Box<dyn Write + Send> {
        if self.mirror_output {
            Box::new(io::stdout())
        } else {
            Box::new(io::sink())
        }
    }
}

enum PumpError {
    Source(io::Error),
    Sink(io::Error),
}

async fn pump<R, W>(mut source: R, mut sink: W) -> std::result::Result<u64, PumpError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; PUMP_CHUNK];
    let mut total = 0u64;
    loop {
        let n = source.read(&mut buf).await.map_err(PumpError::Source)?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n]).await.map_err(PumpError::Sink)?;
        total += n as u64;
    }
    sink.shutdown().await.map_err(PumpError::Sink)?;
    Ok(total)
}

async fn collect_output(
    task: JoinHandle<io::Result<TeeWriter<Box<dyn Write + Send>>>>,
    stream: &str,
) -> String {
    match task.await {
        Ok(Ok(tee)) => tee.into_string(),
        Ok(Err(e)) => {
            warn!(stream, error = %e, "failed to read tar output");
            String::new()
        }
        Err(e) => {
            warn!(stream, error = %e, "tar output reader panicked");
            String::new()
        }
    }
}

/// Recover a network error smuggled through an `io::Error` by the HTTP body reader
fn source_error(e: io::Error) -> Error {
    if !e
        .get_ref()
        .is_some_and(|inner| inner.is::<reqwest::Error>())
    {
        return Error::Io(e);
    }
    match e.into_inner().map(|inner| inner.downcast::<reqwest::Error>()) {
        Some(Ok(network)) => Error::Network(*network),
        Some(Err(other)) => Error::Io(io::Error::other(other)),
        None => Error::Io(io::Error::other("archive source failed")),
    }
}

fn render_command(binary: &Path, args: &[OsString]) -> String {
    let mut rendered = binary.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn gnu_args_tolerate_bsd_archives() {
        let args = zstd_extract_args(&TarVariant::gnu("1.34"), Path::new("/tmp/dest"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "-x",
                "--zstd",
                "--warning=no-unknown-keyword",
                "--overwrite",
                "-f",
                "-",
                "-C",
                "/tmp/dest"
            ]
        );
    }

    #[test]
    fn bsd_args_have_no_gnu_flags() {
        let args = zstd_extract_args(&TarVariant::bsd("3.6.2"), Path::new("/tmp/dest"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["-x", "--zstd", "-f", "-", "-C", "/tmp/dest"]);
    }

    #[test]
    fn command_is_rendered_for_diagnostics() {
        let args = zstd_extract_args(&TarVariant::bsd("3.6.2"), Path::new("/d"));
        assert_eq!(
            render_command(Path::new("/usr/bin/tar"), &args),
            "/usr/bin/tar -x --zstd -f - -C /d"
        );
    }

    #[test]
    fn plain_io_errors_stay_io() {
        let err = source_error(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn pump_copies_everything_and_closes_sink() {
        let payload = vec![7u8; PUMP_CHUNK * 2 + 5];
        let mut sink = Vec::new();
        let total = pump(&payload[..], &mut sink).await.ok().unwrap();
        assert_eq!(total, payload.len() as u64);
        assert_eq!(sink, payload);
    }

    #[tokio::test]
    async fn missing_tar_binary_is_external_tool_error() {
        let extractor =
            ZstdTarExtractor::new(CliTar::new(PathBuf::from("/nonexistent/tar-xyz")), false);
        let dest = tempfile::tempdir().unwrap();
        let err = extractor
            .extract(&b"data"[..], dest.path(), &TarVariant::gnu("1.34"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExternalTool(_)));
    }
}
