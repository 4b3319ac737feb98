//! Metadata resolution: ask the extraction service about a URL without
//! downloading anything, and normalize the answer into a `MediaInfo`.
//!
//! The service sits behind [`MediaExtractor`] so the coordinator can be driven
//! by a fake in tests; [`YtDlpExtractor`] is the real implementation.

mod ytdlp;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::media::{select_best_audio, AudioStream, FormatDescriptor, MediaInfo};

pub use ytdlp::YtDlpExtractor;

/// Extraction or transport failure. The message is the service's own, shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ResolveError {
    pub message: String,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Raw answer of the extraction service.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMedia {
    pub id: String,
    pub title: String,
    pub duration_seconds: u64,
    pub formats: Vec<FormatDescriptor>,
}

/// External metadata extraction service, queried in simulate mode (no files written).
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ExtractedMedia, ResolveError>;
}

/// Turns a URL into a `MediaInfo` using a [`MediaExtractor`].
#[derive(Clone)]
pub struct MetadataResolver {
    extractor: Arc<dyn MediaExtractor>,
}

impl MetadataResolver {
    pub fn new(extractor: Arc<dyn MediaExtractor>) -> Self {
        Self { extractor }
    }

    /// Resolves `url`. Does not touch shared state; the caller applies the result.
    pub async fn resolve(&self, url: &str) -> Result<MediaInfo, ResolveError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ResolveError::new("no URL given"));
        }
        tracing::debug!(url, "resolving metadata");
        let extracted = self.extractor.extract(url).await?;
        let info = build_media_info(url, extracted);
        tracing::info!(
            id = %info.id,
            duration = info.duration_seconds,
            audio = info.audio.is_some(),
            "metadata resolved"
        );
        Ok(info)
    }
}

/// Normalizes an extraction result; audio fields come from the best audio-only format.
pub fn build_media_info(url: &str, extracted: ExtractedMedia) -> MediaInfo {
    let audio = select_best_audio(&extracted.formats).map(|best| AudioStream {
        bitrate_kbps: best.bitrate,
        filesize_bytes: best.filesize,
    });
    MediaInfo {
        id: extracted.id,
        title: extracted.title,
        duration_seconds: extracted.duration_seconds,
        url: url.to_string(),
        audio,
    }
}
