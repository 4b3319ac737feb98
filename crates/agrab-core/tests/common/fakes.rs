//! In-process stand-ins for the extraction service, the downloader and the
//! media tool. They touch the filesystem the way the real programs do.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use agrab_core::coordinator::Services;
use agrab_core::download::{AudioDownloader, AudioFetch, DownloadError, DownloaderProgress};
use agrab_core::media::FormatDescriptor;
use agrab_core::resolver::{ExtractedMedia, MediaExtractor, ResolveError};
use agrab_core::segmenter::{SegmentError, SegmentTool};

pub const CODEC: &str = "mp3";

pub struct FixedExtractor(pub Result<ExtractedMedia, ResolveError>);

#[async_trait]
impl MediaExtractor for FixedExtractor {
    async fn extract(&self, _url: &str) -> Result<ExtractedMedia, ResolveError> {
        self.0.clone()
    }
}

pub fn media(title: &str, duration_seconds: u64) -> ExtractedMedia {
    ExtractedMedia {
        id: "id-1".to_string(),
        title: title.to_string(),
        duration_seconds,
        formats: vec![
            FormatDescriptor::audio(64.0, Some(1_000_000)),
            FormatDescriptor::audio(128.0, Some(6_400_000)),
        ],
    }
}

/// Reports progress in four steps and writes the transcoded file.
pub struct FileDownloader;

#[async_trait]
impl AudioDownloader for FileDownloader {
    async fn download(
        &self,
        fetch: &AudioFetch,
        on_progress: &mut (dyn FnMut(DownloaderProgress) + Send),
    ) -> Result<(), DownloadError> {
        for done in [0u64, 250, 500, 1000] {
            on_progress(DownloaderProgress::Downloading {
                downloaded_bytes: done,
                total_bytes_estimate: Some(1000),
            });
        }
        on_progress(DownloaderProgress::Finished);
        let path = fetch.output_template.replace("%(ext)s", &fetch.codec);
        tokio::fs::write(&path, b"transcoded audio")
            .await
            .map_err(|e| DownloadError::Downloader(e.to_string()))?;
        Ok(())
    }
}

/// Writes one empty file per part, like `-f segment` would.
pub struct PartWriter {
    pub duration_seconds: u64,
}

#[async_trait]
impl SegmentTool for PartWriter {
    async fn split(
        &self,
        _input: &Path,
        segment_seconds: u64,
        pattern: &Path,
    ) -> Result<(), SegmentError> {
        let pattern = pattern.to_string_lossy();
        let parts = self.duration_seconds.div_ceil(segment_seconds);
        for i in 0..parts {
            let part = PathBuf::from(pattern.replace("%03d", &format!("{i:03}")));
            std::fs::write(part, b"").map_err(|source| SegmentError::Spawn {
                tool: "part-writer".to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Fails like the media tool does on a bad input.
pub struct BrokenTool;

#[async_trait]
impl SegmentTool for BrokenTool {
    async fn split(&self, _: &Path, _: u64, _: &Path) -> Result<(), SegmentError> {
        Err(SegmentError::ToolFailed {
            message: "Invalid argument".to_string(),
        })
    }
}

pub fn services(
    extracted: Result<ExtractedMedia, ResolveError>,
    segment_tool: Arc<dyn SegmentTool>,
) -> Services {
    Services {
        extractor: Arc::new(FixedExtractor(extracted)),
        downloader: Arc::new(FileDownloader),
        segment_tool,
        audio_codec: CODEC.to_string(),
    }
}
