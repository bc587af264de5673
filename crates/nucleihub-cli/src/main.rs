mod banner;
mod commands;
mod config;
mod logging;
mod validator;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use crate::commands::download::DownloadArgs;
use crate::commands::duplicate::DuplicateArgs;
use crate::validator::ScannerValidator;

#[derive(Parser)]
#[command(name = "nucleihub")]
#[command(about = "Community edition nuclei templates")]
#[command(long_about = "Collect the scanner templates published by the community into one place.

Examples:
  # Step 1, download
  cat reponames.txt | nucleihub download --output-directory ~/nucleihub-downloaded-repos

  # Step 2, remove duplicates
  nucleihub duplicate --input-directory ~/nucleihub-downloaded-repos --output-directory ~/nucleihub-templates --large-content")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print the version of the tool and exit
    #[arg(short = 'v', long = "version")]
    version: bool,
    /// Update nucleihub to the latest version
    #[arg(short = 'u', long = "update")]
    update: bool,
    /// Do not print the banner
    #[arg(long, global = true)]
    silent: bool,
    /// Read settings from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Clone repositories and download templates or archives listed on stdin
    Download(DownloadArgs),
    /// Copy templates into one directory, resolving same-named files
    Duplicate(DuplicateArgs),
    /// Check for today's commits in branch archive URLs
    Updatecheck {
        /// Branch archive URLs ending in /main.zip or /master.zip
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    if !cli.silent {
        banner::print();
    }

    if cli.version {
        println!("{}", banner::version_line());
        return Ok(());
    }

    let app_config = config::load_config(cli.config.as_deref());

    if cli.update {
        return commands::update::run(&app_config.update).await;
    }

    match cli.command {
        Some(Command::Download(args)) => {
            let fetch_config = args.resolve(&app_config.download);
            commands::download::run(fetch_config, nucleihub_remote::default_backends()).await
        }
        Some(Command::Duplicate(args)) => {
            let dedup_config = args.resolve(&app_config.duplicate);
            let validator = Arc::new(ScannerValidator::new(&app_config.duplicate.validator));
            commands::duplicate::run(dedup_config, validator).await
        }
        Some(Command::Updatecheck { urls }) => commands::updatecheck::run(urls).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn short_version_flag_is_ours() {
        let cli = Cli::try_parse_from(["nucleihub", "-v"]).unwrap();
        assert!(cli.version);
        assert!(cli.command.is_none());
    }

    #[test]
    fn download_flags_parse() {
        let cli = Cli::try_parse_from([
            "nucleihub", "download", "-o", "/tmp/out", "-p", "4", "-d", "0", "--keepzip",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Download(args)) => {
                assert_eq!(args.output_directory, Some(PathBuf::from("/tmp/out")));
                assert_eq!(args.parallel, Some(4));
                assert_eq!(args.depth, Some(0));
                assert!(args.keep_zip);
            }
            _ => panic!("expected download"),
        }
    }

    #[test]
    fn zero_parallel_is_rejected() {
        assert!(Cli::try_parse_from(["nucleihub", "download", "-p", "0"]).is_err());
    }

    #[test]
    fn silent_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["nucleihub", "duplicate", "--large-content", "--silent"]).unwrap();
        assert!(cli.silent);
        match cli.command {
            Some(Command::Duplicate(args)) => {
                assert!(args.large_content);
                assert!(!args.no_validate);
            }
            _ => panic!("expected duplicate"),
        }
    }

    #[test]
    fn updatecheck_takes_positional_urls() {
        let cli = Cli::try_parse_from([
            "nucleihub",
            "updatecheck",
            "https://github.com/a/b/archive/refs/heads/main.zip",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Updatecheck { urls }) => assert_eq!(urls.len(), 1),
            _ => panic!("expected updatecheck"),
        }
    }
}
