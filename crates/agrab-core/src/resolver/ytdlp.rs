//! `yt-dlp -J` as the extraction service.

use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;

use super::{ExtractedMedia, MediaExtractor, ResolveError};
use crate::media::{FormatDescriptor, FormatKind};
use crate::tools::last_stderr_line;

/// Runs `yt-dlp` in simulate mode and parses its JSON dump.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    bin: String,
}

impl YtDlpExtractor {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedMedia, ResolveError> {
        tracing::debug!(bin = %self.bin, url, "running metadata query");
        let output = Command::new(&self.bin)
            .args(["-J", "--no-warnings", "--no-playlist"])
            .arg(url)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ResolveError::new(format!("{} not found", self.bin))
                }
                _ => ResolveError::new(format!("failed to run {}: {}", self.bin, e)),
            })?;

        if !output.status.success() {
            let message = last_stderr_line(&output.stderr)
                .unwrap_or_else(|| format!("{} exited with {}", self.bin, output.status));
            tracing::warn!(url, %message, "metadata query failed");
            return Err(ResolveError::new(message));
        }

        parse_dump(&output.stdout)
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    abr: Option<f64>,
    #[serde(default)]
    filesize: Option<u64>,
    #[serde(default)]
    filesize_approx: Option<u64>,
}

impl YtDlpFormat {
    fn kind(&self) -> FormatKind {
        let has = |codec: &Option<String>| codec.as_deref().is_some_and(|c| c != "none");
        let labelled_audio_only = self
            .format
            .as_deref()
            .is_some_and(|f| f.contains("audio only"));
        let has_audio = has(&self.acodec);
        let has_video = has(&self.vcodec);

        if labelled_audio_only || (has_audio && self.vcodec.as_deref() == Some("none")) {
            FormatKind::Audio
        } else if has_audio && has_video {
            FormatKind::Muxed
        } else if has_video {
            FormatKind::Video
        } else {
            FormatKind::Other
        }
    }

    fn into_descriptor(self) -> FormatDescriptor {
        FormatDescriptor {
            kind: self.kind(),
            bitrate: self.abr,
            filesize: self.filesize.or(self.filesize_approx),
        }
    }
}

/// Parses the single-JSON dump printed by `yt-dlp -J`.
fn parse_dump(stdout: &[u8]) -> Result<ExtractedMedia, ResolveError> {
    let info: YtDlpInfo = serde_json::from_slice(stdout)
        .map_err(|e| ResolveError::new(format!("unreadable metadata: {e}")))?;

    let duration_seconds = info
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d.round() as u64)
        .unwrap_or(0);

    Ok(ExtractedMedia {
        title: info.title.unwrap_or_else(|| info.id.clone()),
        id: info.id,
        duration_seconds,
        formats: info
            .formats
            .into_iter()
            .map(YtDlpFormat::into_descriptor)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::select_best_audio;

    const DUMP: &str = r#"{
        "id": "dQw4w9WgXcQ",
        "title": "Song",
        "duration": 212.4,
        "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "formats": [
            {"format_id": "sb0", "format": "sb0 - 48x27 (storyboard)", "acodec": "none", "vcodec": "none"},
            {"format_id": "139", "format": "139 - audio only (low)", "acodec": "mp4a.40.5", "vcodec": "none", "abr": 48.8, "filesize": 1297300},
            {"format_id": "251", "format": "251 - audio only (medium)", "acodec": "opus", "vcodec": "none", "abr": 129.5, "filesize": 3437753},
            {"format_id": "18", "format": "18 - 640x360 (360p)", "acodec": "mp4a.40.2", "vcodec": "avc1.42001E", "abr": 96.0, "filesize_approx": 8000000},
            {"format_id": "137", "format": "137 - 1920x1080 (1080p)", "acodec": "none", "vcodec": "avc1.640028", "filesize": 80000000}
        ]
    }"#;

    #[test]
    fn parse_dump_extracts_fields() {
        let media = parse_dump(DUMP.as_bytes()).unwrap();
        assert_eq!(media.id, "dQw4w9WgXcQ");
        assert_eq!(media.title, "Song");
        assert_eq!(media.duration_seconds, 212);
        assert_eq!(media.formats.len(), 5);
    }

    #[test]
    fn parse_dump_classifies_formats() {
        let media = parse_dump(DUMP.as_bytes()).unwrap();
        let kinds: Vec<_> = media.formats.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FormatKind::Other,
                FormatKind::Audio,
                FormatKind::Audio,
                FormatKind::Muxed,
                FormatKind::Video
            ]
        );
        assert_eq!(media.formats[3].filesize, Some(8_000_000));
    }

    #[test]
    fn parse_dump_best_audio_is_opus() {
        let media = parse_dump(DUMP.as_bytes()).unwrap();
        let best = select_best_audio(&media.formats).unwrap();
        assert_eq!(best.bitrate, Some(129.5));
        assert_eq!(best.filesize, Some(3_437_753));
    }

    #[test]
    fn parse_dump_missing_optional_fields() {
        let media = parse_dump(br#"{"id": "live1"}"#).unwrap();
        assert_eq!(media.title, "live1");
        assert_eq!(media.duration_seconds, 0);
        assert!(media.formats.is_empty());
    }

    #[test]
    fn parse_dump_garbage_is_an_error() {
        let err = parse_dump(b"not json").unwrap_err();
        assert!(err.message.starts_with("unreadable metadata"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn extract_reports_last_stderr_line() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ytdlp");
        std::fs::write(
            &script,
            "#!/bin/sh\necho '[generic] Extracting URL' >&2\necho 'ERROR: Unsupported URL: nope' >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = YtDlpExtractor::new(script.to_string_lossy());
        let err = extractor.extract("nope").await.unwrap_err();
        assert_eq!(err.message, "ERROR: Unsupported URL: nope");
    }

    #[tokio::test]
    async fn extract_missing_binary() {
        let extractor = YtDlpExtractor::new("agrab-no-such-ytdlp");
        let err = extractor.extract("https://example.com").await.unwrap_err();
        assert_eq!(err.message, "agrab-no-such-ytdlp not found");
    }
}
