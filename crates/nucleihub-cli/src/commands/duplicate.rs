use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use nucleihub::{DedupConfig, Deduplicator, TemplateValidator, expand_home};

use crate::config::DuplicateConfig;

#[derive(Debug, Args)]
pub struct DuplicateArgs {
    /// Directory to scan for templates
    #[arg(long)]
    pub input_directory: Option<PathBuf>,
    /// Directory to save processed templates
    #[arg(long)]
    pub output_directory: Option<PathBuf>,
    /// Only save the largest file content if duplicates are found
    #[arg(long)]
    pub large_content: bool,
    /// Save templates without running the validator
    #[arg(long)]
    pub no_validate: bool,
}

impl DuplicateArgs {
    pub fn resolve(self, defaults: &DuplicateConfig) -> DedupConfig {
        let input = self
            .input_directory
            .unwrap_or_else(|| defaults.input_directory.clone());
        let output = self
            .output_directory
            .unwrap_or_else(|| defaults.output_directory.clone());

        DedupConfig {
            input_root: expand_home(&input),
            output_root: expand_home(&output),
            large_content: self.large_content,
            skip_validation: self.no_validate,
        }
    }
}

/// Resolve every template group, printing one line per candidate decision.
pub async fn run(config: DedupConfig, validator: Arc<dyn TemplateValidator>) -> Result<()> {
    let input = config.input_root.clone();
    let summary = Deduplicator::new(config, validator)
        .run(|event| println!("{event}"))
        .await
        .with_context(|| format!("failed to scan {}", input.display()))?;

    tracing::info!(
        groups = summary.groups,
        saved = summary.saved,
        invalid = summary.invalid,
        failed = summary.failed,
        overwritten = summary.overwritten,
        "deduplication finished"
    );
    println!("Templates processed successfully.");
    Ok(())
}
