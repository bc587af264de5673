use anyhow::{Context, Result, bail};
use nucleihub_remote::ReleaseClient;
use tokio::process::Command;

use crate::banner::VERSION;
use crate::config::UpdateConfig;

/// Compare versions ignoring a leading `v`.
pub fn is_current(running: &str, latest: &str) -> bool {
    running.trim_start_matches('v') == latest.trim().trim_start_matches('v')
}

/// Reinstall the tool when the published version differs from this one.
pub async fn run(config: &UpdateConfig) -> Result<()> {
    let latest = ReleaseClient::new()
        .latest_version(&config.manifest_url)
        .await
        .context("failed to fetch the latest version")?;

    if is_current(VERSION, &latest) {
        println!("There is no latest update; you are using the latest version.");
        return Ok(());
    }

    println!("Updating nucleihub from version v{VERSION} to v{latest}...");

    let Some((program, args)) = config.install.split_first() else {
        bail!("no install command configured");
    };
    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .with_context(|| format!("failed to run {program}"))?;
    if !status.success() {
        bail!("install command exited with {status}");
    }

    println!("nucleihub has been updated to the latest version.");
    Ok(())
}
