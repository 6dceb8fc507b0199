//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use fetchd_core::DEFAULT_CONCURRENCY;

/// Fetch files over HTTP(S) into a configured download directory.
///
/// Requests are taken from positional URLs or, when none are given, from
/// stdin: one bare URL or one JSON request object per line.
#[derive(Parser, Debug)]
#[command(name = "fetchd")]
#[command(author, version, about)]
pub struct Args {
    /// URLs to download (reads request lines from stdin when omitted)
    pub urls: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Download directory (overrides the config file)
    #[arg(short = 'd', long)]
    pub download_dir: Option<PathBuf>,

    /// Relative subdirectory under the download directory
    #[arg(short = 's', long)]
    pub subdir: Option<String>,

    /// Override the derived filename (applies to every given URL)
    #[arg(short = 'f', long)]
    pub filename: Option<String>,

    /// Overwrite existing files instead of renaming with a numeric suffix
    #[arg(long)]
    pub overwrite: bool,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,
}
