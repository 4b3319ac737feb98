//! Download job: fetch the best audio stream, transcode it, optionally split it.
//!
//! The downloader/transcoder sits behind [`AudioDownloader`]; [`YtDlpDownloader`]
//! is the real implementation. [`DownloadJob`] drives it and turns its
//! callbacks into [`ProgressEvent`]s.

mod job;
mod progress;
mod request;
mod ytdlp;

use async_trait::async_trait;
use thiserror::Error;

use crate::segmenter::SegmentError;

pub use job::DownloadJob;
pub use progress::{percent_of, ProgressEvent, ProgressTracker};
pub use request::{
    final_output_path, output_template, DownloadRequest, SegmentOptions, TranscodeOptions,
};
pub use ytdlp::YtDlpDownloader;

/// Failure of a download job. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The downloader/transcoder failed; carries its message verbatim.
    #[error("{0}")]
    Downloader(String),
    /// The output path has no usable file name.
    #[error("invalid output path: {0:?}")]
    InvalidOutput(String),
    /// Splitting the finished file failed.
    #[error(transparent)]
    Segment(#[from] SegmentError),
}

/// What the downloader is asked to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFetch {
    pub url: String,
    /// `<dir>/<stem>.%(ext)s`
    pub output_template: String,
    /// Codec of the audio-extraction post-processor (e.g. "mp3").
    pub codec: String,
    /// Bitrate in kbit/s passed to the post-processor, if any.
    pub quality_kbps: Option<String>,
}

impl AudioFetch {
    /// Best audio-only stream, or the best muxed stream as a fallback.
    pub const FORMAT_SELECTOR: &'static str = "bestaudio/best";
}

/// Callback payload of the downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloaderProgress {
    Downloading {
        downloaded_bytes: u64,
        total_bytes_estimate: Option<u64>,
    },
    /// Transfer done; post-processing (transcode) starts.
    Finished,
    Error,
}

/// External downloader + transcoder.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    async fn download(
        &self,
        fetch: &AudioFetch,
        on_progress: &mut (dyn FnMut(DownloaderProgress) + Send),
    ) -> Result<(), DownloadError>;
}
