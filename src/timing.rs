//! Phase timing for the download pipeline
//!
//! Download-first runs measure the download and the extraction separately.
//! Streamed runs overlap the two, so only the combined time exists; the
//! sub-phase fields are absent from that shape rather than zero.

use std::future::Future;
use std::time::{Duration, Instant};

/// Measured durations, in whole milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadDurations {
    /// Full download, then extraction
    DownloadFirst {
        /// Time spent downloading
        download_ms: u64,
        /// Time spent extracting
        extraction_ms: u64,
        /// Download plus extraction
        combined_ms: u64,
    },
    /// Download and extraction overlapped
    Streamed {
        /// Time from request to tar exit
        combined_ms: u64,
    },
}

impl DownloadDurations {
    /// Combined duration, defined for both shapes
    pub fn combined_ms(&self) -> u64 {
        match self {
            Self::DownloadFirst { combined_ms, .. } | Self::Streamed { combined_ms } => {
                *combined_ms
            }
        }
    }

    /// Whether extraction overlapped the download
    pub fn is_streamed(&self) -> bool {
        matches!(self, Self::Streamed { .. })
    }
}

/// Run `fut`, returning its output and how long it took
pub async fn timed<F: Future>(fut: F) -> (F::Output, Duration) {
    let start = Instant::now();
    let output = fut.await;
    (output, start.elapsed())
}

/// Records phase durations for one acquisition
#[derive(Debug, Default)]
pub struct TimingRecorder {
    download: Option<Duration>,
    extraction: Option<Duration>,
    streamed: Option<Duration>,
}

impl TimingRecorder {
    /// Fresh recorder with nothing measured
    pub fn new() -> Self {
        Self::default()
    }

    /// Time the buffered download phase
    pub async fn download<F: Future>(&mut self, fut: F) -> F::Output {
        let (output, elapsed) = timed(fut).await;
        self.download = Some(elapsed);
        output
    }

    /// Time the buffered extraction phase
    pub async fn extraction<F: Future>(&mut self, fut: F) -> F::Output {
        let (output, elapsed) = timed(fut).await;
        self.extraction = Some(elapsed);
        output
    }

    /// Time the overlapped download and extraction
    pub async fn streamed<F: Future>(&mut self, fut: F) -> F::Output {
        let (output, elapsed) = timed(fut).await;
        self.streamed = Some(elapsed);
        output
    }

    /// Assemble the durations for whichever path ran
    ///
    /// `None` if neither shape was fully measured. The combined time of a
    /// download-first run is the sum of the two measured phases, so the
    /// millisecond values always add up to within one millisecond.
    pub fn finish(&self) -> Option<DownloadDurations> {
        match (self.streamed, self.download, self.extraction) {
            (Some(streamed), _, _) => Some(DownloadDurations::Streamed {
                combined_ms: millis(streamed),
            }),
            (None, Some(download), Some(extraction)) => Some(DownloadDurations::DownloadFirst {
                download_ms: millis(download),
                extraction_ms: millis(extraction),
                combined_ms: millis(download + extraction),
            }),
            _ => None,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
