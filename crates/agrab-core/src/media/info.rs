//! Resolved media record and its display text.

use std::fmt::Write as _;

use super::sanitize::sanitize_filename;

/// Stem used when the title sanitizes to nothing.
const FALLBACK_STEM: &str = "audio";

/// Audio fields derived from the best audio-only format.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStream {
    /// Average bitrate in kbit/s.
    pub bitrate_kbps: Option<f64>,
    /// Estimated size of the audio stream in bytes.
    pub filesize_bytes: Option<u64>,
}

/// Metadata of a successfully resolved URL. Replaced wholesale on each resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub id: String,
    pub title: String,
    pub duration_seconds: u64,
    /// The URL the user asked for; downloads always target this.
    pub url: String,
    /// `None` when the service offered no audio-only format.
    pub audio: Option<AudioStream>,
}

impl MediaInfo {
    pub fn audio_bitrate_kbps(&self) -> Option<f64> {
        self.audio.as_ref().and_then(|a| a.bitrate_kbps)
    }

    pub fn audio_filesize_bytes(&self) -> Option<u64> {
        self.audio.as_ref().and_then(|a| a.filesize_bytes)
    }

    /// Whether a download may be started for this media (needs an audio-only format).
    pub fn is_downloadable(&self) -> bool {
        self.audio.is_some()
    }

    /// Multi-line description shown after a successful resolve.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Name: {}\nDuration: {}",
            self.title,
            format_duration(self.duration_seconds)
        );
        if let Some(size) = self.audio_filesize_bytes() {
            let _ = write!(out, ", Size: {:.2} MB", size as f64 / 1_048_576.0);
        }
        if let Some(abr) = self.audio_bitrate_kbps() {
            let _ = write!(out, ", Bitrate: {} kbit/s", abr.trunc() as u64);
        }
        if self.audio.is_none() {
            out.push_str("\nNo audio-only stream available.");
        }
        out
    }

    /// Default output filename: sanitized title plus the codec extension.
    pub fn suggested_filename(&self, extension: &str) -> String {
        let stem = sanitize_filename(&self.title);
        let stem = match stem.trim() {
            "" => FALLBACK_STEM,
            s => s,
        };
        format!("{stem}.{extension}")
    }
}

/// Formats seconds as `H:MM:SS`.
pub fn format_duration(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{h}:{m:02}:{s:02}")
}
