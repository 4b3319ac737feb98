//! CLI for agrab.

mod commands;

use agrab_core::config::{self, QUALITY_CHOICES};
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_check, run_get, run_info, GetOptions};

/// Top-level CLI for agrab.
#[derive(Debug, Parser)]
#[command(name = "agrab")]
#[command(about = "agrab: download the audio track of a media URL", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show name, duration, size and bitrate of a URL without downloading.
    Info {
        /// Media page URL.
        url: String,
    },

    /// Download the best audio stream of a URL and transcode it.
    Get {
        /// Media page URL.
        url: String,

        /// Output file or directory. The extension is replaced by the codec.
        /// Default: `<title>.<codec>` in the current directory.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Length of one part in minutes (default from config).
        #[arg(long, value_name = "N")]
        segment_minutes: Option<u64>,

        /// Keep the download as a single file.
        #[arg(long)]
        no_split: bool,

        /// Target bitrate in kbit/s (default from config).
        #[arg(
            long,
            value_name = "KBPS",
            value_parser = PossibleValuesParser::new(QUALITY_CHOICES.iter().copied()),
            conflicts_with = "no_quality"
        )]
        quality: Option<String>,

        /// Let the transcoder pick the bitrate.
        #[arg(long)]
        no_quality: bool,
    },

    /// Check that yt-dlp and ffmpeg can be found.
    Check,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Info { url } => run_info(&cfg, &url).await?,
            CliCommand::Get {
                url,
                output,
                segment_minutes,
                no_split,
                quality,
                no_quality,
            } => {
                let opts = GetOptions {
                    output,
                    segment_minutes,
                    no_split,
                    quality,
                    no_quality,
                };
                run_get(&cfg, &url, opts).await?;
            }
            CliCommand::Check => run_check(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
