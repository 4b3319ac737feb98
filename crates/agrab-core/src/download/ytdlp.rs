//! `yt-dlp -x` as the downloader/transcoder.
//!
//! Progress is read from stdout through a machine-readable progress template,
//! one line per update (`--newline`).

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::{AudioDownloader, AudioFetch, DownloadError, DownloaderProgress};

/// Prefix of the lines produced by our progress template.
const PROGRESS_MARKER: &str = "agrab-progress|";

const PROGRESS_TEMPLATE: &str = "download:agrab-progress|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s";

/// Line printed when the audio-extraction post-processor starts.
const EXTRACT_AUDIO_PREFIX: &str = "[ExtractAudio]";

#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    bin: String,
}

impl YtDlpDownloader {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

/// Command-line arguments for one fetch (without the program name).
pub(super) fn build_args(fetch: &AudioFetch) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--newline".to_string(),
        "--progress".to_string(),
        "--no-playlist".to_string(),
        "--progress-template".to_string(),
        PROGRESS_TEMPLATE.to_string(),
        "-f".to_string(),
        AudioFetch::FORMAT_SELECTOR.to_string(),
        "-o".to_string(),
        fetch.output_template.clone(),
        "-x".to_string(),
        "--audio-format".to_string(),
        fetch.codec.clone(),
    ];
    if let Some(q) = &fetch.quality_kbps {
        args.push("--audio-quality".to_string());
        args.push(format!("{q}K"));
    }
    args.push("--".to_string());
    args.push(fetch.url.clone());
    args
}

fn parse_bytes(field: Option<&str>) -> Option<u64> {
    let value: f64 = field?.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then(|| value as u64)
}

/// Translates one stdout line into a progress callback, if it is one.
pub(super) fn parse_progress_line(line: &str) -> Option<DownloaderProgress> {
    let line = line.trim();
    if line.starts_with(EXTRACT_AUDIO_PREFIX) {
        return Some(DownloaderProgress::Finished);
    }
    let rest = line.strip_prefix(PROGRESS_MARKER)?;
    let mut fields = rest.split('|');
    match fields.next()? {
        "downloading" => {
            let downloaded = parse_bytes(fields.next()).unwrap_or(0);
            let total = parse_bytes(fields.next());
            let estimate = parse_bytes(fields.next());
            Some(DownloaderProgress::Downloading {
                downloaded_bytes: downloaded,
                total_bytes_estimate: total.or(estimate),
            })
        }
        "finished" => Some(DownloaderProgress::Finished),
        "error" => Some(DownloaderProgress::Error),
        _ => None,
    }
}

/// Reads one line, decoding invalid UTF-8 lossily (titles and paths in
/// yt-dlp output are not always UTF-8). `None` at end of stream.
async fn next_lossy_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

#[async_trait]
impl AudioDownloader for YtDlpDownloader {
    async fn download(
        &self,
        fetch: &AudioFetch,
        on_progress: &mut (dyn FnMut(DownloaderProgress) + Send),
    ) -> Result<(), DownloadError> {
        let args = build_args(fetch);
        tracing::info!(bin = %self.bin, args = ?args, "starting download");

        let mut child = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    DownloadError::Downloader(format!("{} not found", self.bin))
                }
                _ => DownloadError::Downloader(format!("failed to run {}: {}", self.bin, e)),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Downloader("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Downloader("stderr not captured".to_string()))?;

        // stderr is drained alongside stdout; only its last line is kept.
        let stderr_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            let mut last: Option<String> = None;
            while let Ok(Some(line)) = next_lossy_line(&mut reader, &mut buf).await {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    tracing::debug!(target: "agrab_core::download::ytdlp", "{trimmed}");
                    last = Some(trimmed.to_string());
                }
            }
            last
        });

        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        while let Some(line) = next_lossy_line(&mut reader, &mut buf)
            .await
            .map_err(|e| DownloadError::Downloader(format!("reading progress: {e}")))?
        {
            if let Some(progress) = parse_progress_line(&line) {
                on_progress(progress);
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DownloadError::Downloader(format!("waiting for {}: {}", self.bin, e)))?;
        let last_stderr = stderr_task.await.ok().flatten();

        if !status.success() {
            let message =
                last_stderr.unwrap_or_else(|| format!("{} exited with {}", self.bin, status));
            tracing::warn!(url = %fetch.url, %message, "download failed");
            return Err(DownloadError::Downloader(message));
        }

        tracing::info!(url = %fetch.url, "download finished");
        Ok(())
    }
}
