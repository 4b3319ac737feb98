use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Bitrates (kbit/s) offered for the mp3 transcode.
pub const QUALITY_CHOICES: &[&str] = &["32", "96", "128", "160", "192", "256", "320"];

/// Global configuration loaded from `~/.config/agrab/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgrabConfig {
    /// Name or path of the yt-dlp executable.
    #[serde(default = "default_ytdlp_bin")]
    pub ytdlp_bin: String,
    /// Name or path of the ffmpeg executable (used for splitting).
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,
    /// Codec of the audio-extraction post-processor; also the output extension.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    /// Target bitrate in kbit/s passed to the transcoder. None = transcoder default.
    #[serde(default)]
    pub audio_quality_kbps: Option<String>,
    /// Split the downloaded file into parts by default.
    #[serde(default = "default_split")]
    pub split: bool,
    /// Length of one part in minutes when splitting.
    #[serde(default = "default_segment_minutes")]
    pub segment_minutes: u64,
}

fn default_ytdlp_bin() -> String {
    "yt-dlp".to_string()
}

fn default_ffmpeg_bin() -> String {
    "ffmpeg".to_string()
}

fn default_audio_codec() -> String {
    "mp3".to_string()
}

fn default_split() -> bool {
    true
}

fn default_segment_minutes() -> u64 {
    5
}

impl Default for AgrabConfig {
    fn default() -> Self {
        Self {
            ytdlp_bin: default_ytdlp_bin(),
            ffmpeg_bin: default_ffmpeg_bin(),
            audio_codec: default_audio_codec(),
            audio_quality_kbps: Some("160".to_string()),
            split: default_split(),
            segment_minutes: default_segment_minutes(),
        }
    }
}

impl AgrabConfig {
    /// Segment length in seconds derived from `segment_minutes`.
    pub fn segment_seconds(&self) -> u64 {
        self.segment_minutes.saturating_mul(60)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("agrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AgrabConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AgrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AgrabConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
