//! Post-download split of the final audio file into fixed-length parts.
//!
//! Parts are produced by stream copy (no re-encode) into numbered files next
//! to the input: `<stem>_000.<ext>`, `<stem>_001.<ext>`, ...

mod ffmpeg;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::download::ProgressEvent;

pub use ffmpeg::Ffmpeg;

#[derive(Debug, Error)]
pub enum SegmentError {
    /// The media tool exited non-zero; carries its last stderr line.
    #[error("{message}")]
    ToolFailed { message: String },
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    /// Parts were written but the original could not be deleted.
    #[error("could not remove {}: {source}", path.display())]
    RemoveOriginal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Number of parts for `duration_seconds` cut every `segment_seconds`
/// (`ceil`). Zero when `segment_seconds` is zero.
pub fn segment_count(duration_seconds: u64, segment_seconds: u64) -> u64 {
    if segment_seconds == 0 {
        return 0;
    }
    duration_seconds.div_ceil(segment_seconds)
}

/// Output pattern for the parts of `input`: `<dir>/<stem>_%03d.<ext>`.
pub fn segment_pattern(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().replace('%', "%%"))
        .unwrap_or_default();
    let file = match input.extension() {
        Some(ext) => format!("{stem}_%03d.{}", ext.to_string_lossy()),
        None => format!("{stem}_%03d"),
    };
    match input.parent() {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}

/// Media-processing tool that cuts a file into time-bounded parts.
#[async_trait]
pub trait SegmentTool: Send + Sync {
    async fn split(
        &self,
        input: &Path,
        segment_seconds: u64,
        pattern: &Path,
    ) -> Result<(), SegmentError>;
}

#[derive(Clone)]
pub struct Segmenter {
    tool: Arc<dyn SegmentTool>,
}

impl Segmenter {
    pub fn new(tool: Arc<dyn SegmentTool>) -> Self {
        Self { tool }
    }

    /// Splits `input` into `segment_count` parts and deletes it on success.
    /// On tool failure the original is left untouched.
    pub async fn split(
        &self,
        input: &Path,
        segment_seconds: u64,
        segment_count: u64,
        emit: &mut (dyn FnMut(ProgressEvent) + Send),
    ) -> Result<(), SegmentError> {
        emit(ProgressEvent::Info(format!(
            "splitting into {segment_count} parts"
        )));
        let pattern = segment_pattern(input);
        tracing::info!(
            input = %input.display(),
            segment_seconds,
            segment_count,
            pattern = %pattern.display(),
            "splitting"
        );

        self.tool.split(input, segment_seconds, &pattern).await?;

        tokio::fs::remove_file(input)
            .await
            .map_err(|source| SegmentError::RemoveOriginal {
                path: input.to_path_buf(),
                source,
            })?;
        tracing::debug!(input = %input.display(), "original removed after split");
        Ok(())
    }
}
