use std::path::PathBuf;
use std::sync::Arc;

use super::progress::{percent_of, ProgressEvent, ProgressTracker};
use super::request::{final_output_path, output_template, DownloadRequest};
use super::{AudioDownloader, AudioFetch, DownloadError, DownloaderProgress};
use crate::segmenter::{segment_count, Segmenter};

/// Info line emitted when the transcode starts.
pub const POST_PROCESSING_INFO: &str = "post-processing";
/// Info line emitted when the downloader reports an error status.
pub const DOWNLOAD_ERROR_INFO: &str = "download error";

/// One download + transcode (+ split) of the current media.
pub struct DownloadJob {
    request: DownloadRequest,
    duration_seconds: u64,
    codec: String,
    downloader: Arc<dyn AudioDownloader>,
    segmenter: Segmenter,
}

impl DownloadJob {
    pub fn new(
        request: DownloadRequest,
        duration_seconds: u64,
        codec: impl Into<String>,
        downloader: Arc<dyn AudioDownloader>,
        segmenter: Segmenter,
    ) -> Self {
        Self {
            request,
            duration_seconds,
            codec: codec.into(),
            downloader,
            segmenter,
        }
    }

    /// Path of the transcoded file this job produces (before any split).
    pub fn final_path(&self) -> Result<PathBuf, DownloadError> {
        final_output_path(&self.request.output_path, &self.codec)
    }

    /// Runs the job to completion. Every path ends with exactly one
    /// `Finished` or `Failed` event; the returned result mirrors it.
    pub async fn run(
        &self,
        emit: &mut (dyn FnMut(ProgressEvent) + Send),
    ) -> Result<(), DownloadError> {
        emit(ProgressEvent::Started);
        let result = self.run_steps(emit).await;
        match &result {
            Ok(()) => emit(ProgressEvent::Finished),
            Err(e) => {
                tracing::warn!(url = %self.request.source_url, error = %e, "download job failed");
                emit(ProgressEvent::Failed(e.to_string()));
            }
        }
        result
    }

    async fn run_steps(
        &self,
        emit: &mut (dyn FnMut(ProgressEvent) + Send),
    ) -> Result<(), DownloadError> {
        let fetch = AudioFetch {
            url: self.request.source_url.clone(),
            output_template: output_template(&self.request.output_path)?,
            codec: self.codec.clone(),
            quality_kbps: self.request.transcode.target_quality_kbps.clone(),
        };
        let final_path = self.final_path()?;

        let mut tracker = ProgressTracker::default();
        let mut post_processing = false;
        self.downloader
            .download(&fetch, &mut |progress| match progress {
                DownloaderProgress::Downloading {
                    downloaded_bytes,
                    total_bytes_estimate,
                } => {
                    if let Some(pct) = percent_of(downloaded_bytes, total_bytes_estimate)
                        .and_then(|p| tracker.advance(p))
                    {
                        emit(ProgressEvent::Progress(pct));
                    }
                }
                DownloaderProgress::Finished => {
                    if !post_processing {
                        post_processing = true;
                        emit(ProgressEvent::Info(POST_PROCESSING_INFO.to_string()));
                    }
                    if let Some(pct) = tracker.advance(100) {
                        emit(ProgressEvent::Progress(pct));
                    }
                }
                DownloaderProgress::Error => {
                    emit(ProgressEvent::Info(DOWNLOAD_ERROR_INFO.to_string()));
                }
            })
            .await?;

        let segment = self.request.segment;
        if segment.enabled && segment.segment_seconds > 0 {
            let count = segment_count(self.duration_seconds, segment.segment_seconds);
            if count > 1 {
                self.segmenter
                    .split(&final_path, segment.segment_seconds, count, emit)
                    .await?;
            } else {
                tracing::debug!(
                    duration = self.duration_seconds,
                    segment_seconds = segment.segment_seconds,
                    "single part; split skipped"
                );
            }
        }

        Ok(())
    }
}
