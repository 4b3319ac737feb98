//! Download request built from user input, and output path derivation.

use std::path::{Path, PathBuf};

use super::DownloadError;

/// Post-download split settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentOptions {
    pub enabled: bool,
    /// Length of one part in seconds; 0 disables splitting.
    pub segment_seconds: u64,
}

/// Transcode settings for the audio-extraction post-processor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranscodeOptions {
    /// Target bitrate in kbit/s (e.g. "160"). None = transcoder default.
    pub target_quality_kbps: Option<String>,
}

/// One download trigger. Built fresh from user input each time; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Overwritten by the coordinator with the last resolved media URL.
    pub source_url: String,
    pub output_path: PathBuf,
    pub segment: SegmentOptions,
    pub transcode: TranscodeOptions,
}

impl DownloadRequest {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            source_url: String::new(),
            output_path: output_path.into(),
            segment: SegmentOptions::default(),
            transcode: TranscodeOptions::default(),
        }
    }

    pub fn with_segments(mut self, segment_seconds: u64) -> Self {
        self.segment = SegmentOptions {
            enabled: true,
            segment_seconds,
        };
        self
    }

    pub fn with_quality(mut self, kbps: impl Into<String>) -> Self {
        self.transcode.target_quality_kbps = Some(kbps.into());
        self
    }
}

fn split_output(output_path: &Path) -> Result<(PathBuf, String), DownloadError> {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DownloadError::InvalidOutput(output_path.display().to_string()))?;
    let dir = output_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok((dir, stem))
}

/// Output template for the downloader: `<dir>/<stem>.%(ext)s`.
///
/// `%` in the stem is doubled so the downloader does not read it as a field.
pub fn output_template(output_path: &Path) -> Result<String, DownloadError> {
    let (dir, stem) = split_output(output_path)?;
    let file = format!("{}.%(ext)s", stem.replace('%', "%%"));
    Ok(dir.join(file).to_string_lossy().into_owned())
}

/// Path of the transcoded file: the output path with its extension replaced by `codec`.
pub fn final_output_path(output_path: &Path, codec: &str) -> Result<PathBuf, DownloadError> {
    let (dir, stem) = split_output(output_path)?;
    Ok(dir.join(format!("{stem}.{codec}")))
}
