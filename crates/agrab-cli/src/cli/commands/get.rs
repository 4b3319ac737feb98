//! `agrab get` – resolve a URL, then download, transcode and split its audio.

use agrab_core::config::AgrabConfig;
use agrab_core::coordinator::{CoordinatorEvent, JobCoordinator, Services};
use agrab_core::download::{DownloadRequest, ProgressEvent, SegmentOptions};
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use super::info::resolve_metadata;

/// `get` flags as parsed; unset values fall back to the config.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub output: Option<PathBuf>,
    pub segment_minutes: Option<u64>,
    pub no_split: bool,
    pub quality: Option<String>,
    pub no_quality: bool,
}

/// Output path: `output` itself, or `suggested` inside `output` when it is a
/// directory, or `suggested` in the current directory.
fn output_path(output: Option<&Path>, suggested: &str) -> PathBuf {
    match output {
        Some(dir) if dir.is_dir() => dir.join(suggested),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(suggested),
    }
}

fn build_request(cfg: &AgrabConfig, opts: &GetOptions, output_path: PathBuf) -> DownloadRequest {
    let minutes = opts.segment_minutes.unwrap_or(cfg.segment_minutes);
    let mut request = DownloadRequest::new(output_path);
    request.segment = SegmentOptions {
        enabled: cfg.split && !opts.no_split,
        segment_seconds: minutes.saturating_mul(60),
    };
    request.transcode.target_quality_kbps = if opts.no_quality {
        None
    } else {
        opts.quality.clone().or_else(|| cfg.audio_quality_kbps.clone())
    };
    request
}

pub async fn run_get(cfg: &AgrabConfig, url: &str, opts: GetOptions) -> Result<()> {
    let mut coord = JobCoordinator::new(Services::from_config(cfg));
    let ready = resolve_metadata(&mut coord, url).await?;
    if !ready.resolved {
        bail!("{}", ready.text);
    }
    println!("{}", ready.text);
    if !ready.download_enabled {
        bail!("no audio-only stream to download");
    }

    let suggested = ready
        .suggested_filename
        .unwrap_or_else(|| format!("audio.{}", cfg.audio_codec));
    let request = build_request(cfg, &opts, output_path(opts.output.as_deref(), &suggested));
    let target = request.output_path.clone();
    if !coord.request_download(request) {
        bail!("download could not be started");
    }

    while let Some(event) = coord.next_event().await {
        let CoordinatorEvent::Download(event) = event else {
            continue;
        };
        match event {
            ProgressEvent::Started => println!("Downloading to {}", target.display()),
            ProgressEvent::Progress(pct) => println!("  {pct:>3}%"),
            ProgressEvent::Info(line) => println!("{line}"),
            ProgressEvent::Finished => println!("Done."),
            ProgressEvent::Failed(message) => bail!("{message}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_config_defaults() {
        let cfg = AgrabConfig::default();
        let req = build_request(&cfg, &GetOptions::default(), PathBuf::from("Song.mp3"));
        assert!(req.segment.enabled);
        assert_eq!(req.segment.segment_seconds, 300);
        assert_eq!(req.transcode.target_quality_kbps.as_deref(), Some("160"));
        assert!(req.source_url.is_empty());
    }

    #[test]
    fn request_flags_override_config() {
        let cfg = AgrabConfig::default();
        let opts = GetOptions {
            segment_minutes: Some(2),
            no_split: true,
            quality: Some("320".to_string()),
            ..GetOptions::default()
        };
        let req = build_request(&cfg, &opts, PathBuf::from("Song.mp3"));
        assert!(!req.segment.enabled);
        assert_eq!(req.segment.segment_seconds, 120);
        assert_eq!(req.transcode.target_quality_kbps.as_deref(), Some("320"));
    }

    #[test]
    fn request_without_quality() {
        let cfg = AgrabConfig::default();
        let opts = GetOptions {
            no_quality: true,
            ..GetOptions::default()
        };
        let req = build_request(&cfg, &opts, PathBuf::from("Song.mp3"));
        assert!(req.transcode.target_quality_kbps.is_none());
    }

    #[test]
    fn split_disabled_in_config() {
        let cfg = AgrabConfig {
            split: false,
            ..AgrabConfig::default()
        };
        let req = build_request(&cfg, &GetOptions::default(), PathBuf::from("Song.mp3"));
        assert!(!req.segment.enabled);
    }

    #[test]
    fn output_path_variants() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(output_path(None, "Song.mp3"), PathBuf::from("Song.mp3"));
        assert_eq!(
            output_path(Some(dir.path()), "Song.mp3"),
            dir.path().join("Song.mp3")
        );
        let file = dir.path().join("mine.mp3");
        assert_eq!(output_path(Some(&file), "Song.mp3"), file);
    }
}
