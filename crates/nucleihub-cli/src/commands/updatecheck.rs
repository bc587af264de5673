use std::io::IsTerminal;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use nucleihub_remote::CommitFeedClient;

/// Print every branch archive URL whose repository has a commit today.
///
/// URLs come from `args`, then from stdin when it is not a terminal.
pub async fn run(args: Vec<String>) -> Result<()> {
    let mut urls = args;
    if !std::io::stdin().is_terminal() {
        urls.extend(
            super::read_stdin_lines()
                .await
                .context("failed to read URLs from stdin")?,
        );
    }

    let client = CommitFeedClient::new();
    let today = Local::now().date_naive();
    for url in updated_on(&client, &urls, today).await {
        println!("Updated today: {url}");
    }
    Ok(())
}

/// URLs with commit activity on `day`. Per-URL errors are logged and skipped.
pub async fn updated_on<'a>(
    client: &CommitFeedClient,
    urls: &'a [String],
    day: NaiveDate,
) -> Vec<&'a str> {
    let mut updated = Vec::new();
    for url in urls {
        match client.updated_on(url, day).await {
            Ok(true) => updated.push(url.as_str()),
            Ok(false) => {}
            Err(e) => tracing::error!(%url, "update check failed: {e}"),
        }
    }
    updated
}
