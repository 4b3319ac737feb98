//! Locating the external programs the pipeline shells out to.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::AgrabConfig;

/// A required external program is not installed or not on `PATH`.
#[derive(Debug, Error)]
#[error("required program not found: {name}")]
pub struct ToolMissing {
    pub name: String,
}

/// Resolves `bin` (bare name or path) to an executable path.
pub fn locate(bin: &str) -> Result<PathBuf, ToolMissing> {
    which::which(bin).map_err(|_| ToolMissing {
        name: bin.to_string(),
    })
}

/// Availability of one external program.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub name: String,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }
}

/// Checks every program the configuration refers to (yt-dlp, ffmpeg).
pub fn check_all(cfg: &AgrabConfig) -> Vec<ToolStatus> {
    [cfg.ytdlp_bin.as_str(), cfg.ffmpeg_bin.as_str()]
        .into_iter()
        .map(|bin| {
            let path = locate(bin).ok();
            if path.is_none() {
                tracing::warn!(tool = bin, "external program not found");
            }
            ToolStatus {
                name: bin.to_string(),
                path,
            }
        })
        .collect()
}

/// Last non-empty line of a process' stderr, trimmed.
pub fn last_stderr_line(stderr: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(str::to_string)
}
