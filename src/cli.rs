use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::error::{Result, ReelbatchError};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pad, bannerize and re-encode every video in the input directory
    Edit {
        /// Directory containing source videos
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Directory for edited videos
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Processed-set file
        #[arg(short, long)]
        state_file: Option<PathBuf>,

        /// Quality profile (standard, high)
        #[arg(short, long)]
        profile: Option<String>,

        /// Edit every file, ignoring and not updating the processed-set
        #[arg(long)]
        no_track: bool,

        /// Write a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Download videos from a URL or a list of URLs; prompts when neither is given
    Download {
        /// Single URL to download
        #[arg(short, long, conflicts_with = "list")]
        url: Option<String>,

        /// Text file with one URL per line
        #[arg(short, long)]
        list: Option<PathBuf>,

        /// Destination directory
        #[arg(short, long)]
        dest: Option<PathBuf>,

        /// Write a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

/// What the user asked the downloader to do
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadRequest {
    Single(String),
    List(PathBuf),
}

/// Ask for single-URL or list mode, then for the URL or list path
pub fn prompt_download_request<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<DownloadRequest> {
    let choice = ask(
        input,
        output,
        "Do you want to download a single video (S) or videos from a list file (L)? (S/L): ",
    )?;

    match choice.to_lowercase().as_str() {
        "s" => {
            let url = ask(input, output, "Enter the URL of the video to download: ")?;
            if url.is_empty() {
                return Err(ReelbatchError::InvalidUrl(url));
            }
            Ok(DownloadRequest::Single(url))
        }
        "l" => {
            let path = ask(input, output, "Enter the path to the links file: ")?;
            Ok(DownloadRequest::List(PathBuf::from(path)))
        }
        other => Err(ReelbatchError::Config(format!(
            "Invalid choice '{}'. Please enter 'S' for a single video or 'L' for a list file",
            other
        ))),
    }
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
