use chrono::NaiveDate;

/// Branch archives whose repositories can be polled for commits.
const BRANCH_ARCHIVES: &[&str] = &["/main.zip", "/master.zip"];

/// Errors from the commit-feed and release checks.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("network error: {0}")]
    Network(String),

    #[error("received status code {status} for URL {url}")]
    Status { status: u16, url: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("version not found in {0}")]
    VersionNotFound(String),
}

/// One `<entry>` of a commit feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// RFC 3339 timestamp as it appears in the feed.
    pub updated: String,
}

/// Commit feed for a branch archive URL.
///
/// `…/archive/refs/heads/main.zip` becomes `…/commits/main.atom`. URLs that
/// are not a `main` or `master` archive have no feed.
pub fn commit_feed_url(archive_url: &str) -> Option<String> {
    if !BRANCH_ARCHIVES.iter().any(|s| archive_url.ends_with(s)) {
        return None;
    }
    let rewritten = archive_url.replacen("archive/refs/heads", "commits", 1);
    let stem = rewritten.strip_suffix(".zip")?;
    Some(format!("{stem}.atom"))
}

/// True if any entry was updated on `day`.
pub fn has_activity_on(entries: &[FeedEntry], day: NaiveDate) -> bool {
    let prefix = day.format("%Y-%m-%d").to_string();
    entries.iter().any(|e| e.updated.starts_with(&prefix))
}
