//! Capture-and-mirror writer for child process output
//!
//! Every byte a spawned tar writes is kept in memory for error reporting and
//! also forwarded to a live mirror (normally our own stdout). A failing mirror
//! never loses captured bytes.

use std::io::{self, Write};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::spawn_blocking;
use tracing::warn;

const CHUNK_SIZE: usize = 8 * 1024;

/// Writer that captures everything and mirrors it to `W`
pub struct TeeWriter<W> {
    captured: Vec<u8>,
    mirror: W,
    mirror_failed: bool,
}

impl<W: Write> TeeWriter<W> {
    /// Create a tee that mirrors to `mirror`
    pub fn new(mirror: W) -> Self {
        Self {
            captured: Vec::new(),
            mirror,
            mirror_failed: false,
        }
    }

    /// Bytes captured so far
    pub fn captured(&self) -> &[u8] {
        &self.captured
    }

    /// Whether mirroring has been abandoned after a write error
    pub fn mirror_failed(&self) -> bool {
        self.mirror_failed
    }

    /// Consume the tee, returning the captured bytes
    pub fn into_captured(self) -> Vec<u8> {
        self.captured
    }

    /// Consume the tee, returning the captured bytes as lossy UTF-8
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.captured).into_owned()
    }
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.captured.extend_from_slice(buf);

        if !self.mirror_failed
            && let Err(e) = self.mirror.write_all(buf)
        {
            warn!(error = %e, "failed to mirror tool output, continuing with capture only");
            self.mirror_failed = true;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.mirror_failed {
            self.mirror.flush().ok();
        }
        Ok(())
    }
}

/// Read `reader` to EOF, writing everything into `tee`
///
/// Writes into the tee run on the blocking pool, so a slow mirror (a terminal
/// or a full pipe) stalls only this reader and never a runtime worker.
/// Returns the tee so the caller can collect the captured bytes once the
/// child has exited.
pub async fn drain_into<R, W>(mut reader: R, mut tee: TeeWriter<W>) -> io::Result<TeeWriter<W>>
where
    R: AsyncRead + Unpin,
    W: Write + Send + 'static,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let chunk = buf[..n].to_vec();
        tee = spawn_blocking(move || tee.write_all(&chunk).map(|()| tee))
            .await
            .map_err(io::Error::other)??;
    }
    spawn_blocking(move || tee.flush().map(|()| tee))
        .await
        .map_err(io::Error::other)?
}
