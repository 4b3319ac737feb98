//! `ffmpeg -f segment` as the media-processing tool.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{SegmentError, SegmentTool};
use crate::tools::last_stderr_line;

#[derive(Debug, Clone)]
pub struct Ffmpeg {
    bin: String,
}

impl Ffmpeg {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

/// Arguments for one split (without the program name).
///
/// `-n` makes ffmpeg refuse to overwrite parts that already exist: a repeated
/// split of the same file fails instead of waiting on the overwrite prompt.
fn split_args(input: &Path, segment_seconds: u64, pattern: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-n".into(), "-i".into(), input.into()];
    args.extend(["-f", "segment", "-segment_time"].map(OsString::from));
    args.push(segment_seconds.to_string().into());
    args.extend(["-c", "copy"].map(OsString::from));
    args.push(pattern.into());
    args
}

#[async_trait]
impl SegmentTool for Ffmpeg {
    async fn split(
        &self,
        input: &Path,
        segment_seconds: u64,
        pattern: &Path,
    ) -> Result<(), SegmentError> {
        let args = split_args(input, segment_seconds, pattern);
        tracing::debug!(bin = %self.bin, args = ?args, "running segment split");
        let output = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| SegmentError::Spawn {
                tool: self.bin.clone(),
                source,
            })?;

        if !output.status.success() {
            let message = last_stderr_line(&output.stderr)
                .unwrap_or_else(|| format!("{} exited with {}", self.bin, output.status));
            tracing::warn!(input = %input.display(), %message, "segment split failed");
            return Err(SegmentError::ToolFailed { message });
        }
        Ok(())
    }
}
