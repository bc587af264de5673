use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nucleihub::{FetchBackends, FetchConfig, Fetcher, expand_home};

use crate::config::DownloadConfig;

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Directory to clone or download into
    #[arg(short = 'o', long = "output-directory")]
    pub output_directory: Option<PathBuf>,
    /// Number of operations to perform in parallel
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub parallel: Option<u32>,
    /// Shallow clone depth; use 0 for the full history
    #[arg(short, long)]
    pub depth: Option<u32>,
    /// Keep downloaded .zip files after extracting them
    #[arg(long = "keepzip")]
    pub keep_zip: bool,
}

impl DownloadArgs {
    /// Flags win over the config file.
    pub fn resolve(self, defaults: &DownloadConfig) -> FetchConfig {
        let output_root = self
            .output_directory
            .unwrap_or_else(|| defaults.output_directory.clone());
        let parallel = self.parallel.unwrap_or(defaults.parallel).max(1);

        FetchConfig {
            output_root: expand_home(&output_root),
            concurrency: parallel as usize,
            clone_depth: self.depth.unwrap_or(defaults.depth),
            keep_archive: self.keep_zip || defaults.keep_zip,
        }
    }
}

/// Read URLs from stdin and fetch them, printing one line per outcome.
pub async fn run(config: FetchConfig, backends: FetchBackends) -> Result<()> {
    let urls = super::read_stdin_lines()
        .await
        .context("failed to read URLs from stdin")?;
    tracing::info!(count = urls.len(), root = %config.output_root.display(), "starting download");

    let summary = Fetcher::new(config, backends)
        .run(urls, |report| {
            for outcome in &report.outcomes {
                println!("{outcome}");
            }
        })
        .await;

    tracing::info!(
        total = summary.total,
        failed = summary.failed,
        "download finished"
    );
    Ok(())
}
